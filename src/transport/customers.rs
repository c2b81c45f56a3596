use serde::{Deserialize, Serialize};

use super::{TransportError, is_empty_metadata};
use super::lenient::{lenient, lenient_decimal, lenient_list, lenient_metadata};
use super::number::{TransportCount, TransportDecimal};
use crate::domain::{Balance, CreateCustomer, Customer, CustomerList, CustomerStatus, Metadata};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCustomerJsonRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    external_customer_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    onchain_address: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_metadata")]
    metadata: &'a Metadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerJson {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    external_customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    onchain_address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    is_internal: Option<bool>,
    #[serde(default, deserialize_with = "lenient_metadata")]
    metadata: Metadata,
    #[serde(default, deserialize_with = "lenient")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    updated_at: Option<String>,
}

impl From<CustomerJson> for Customer {
    fn from(value: CustomerJson) -> Self {
        Self {
            id: value.id.unwrap_or_default(),
            external_customer_id: value.external_customer_id,
            onchain_address: value.onchain_address,
            status: value.status.as_deref().map(CustomerStatus::from_wire),
            is_internal: value.is_internal.unwrap_or(false),
            metadata: value.metadata,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CustomerListJsonResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    data: Vec<CustomerJson>,
    #[serde(default, deserialize_with = "lenient")]
    count: Option<TransportCount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceJsonResponse {
    #[serde(default, deserialize_with = "lenient")]
    customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    balance_usdc: Option<TransportDecimal>,
}

pub fn encode_create_customer_json(request: &CreateCustomer) -> Result<String, TransportError> {
    let body = CreateCustomerJsonRequest {
        external_customer_id: request.external_customer_id(),
        onchain_address: request.onchain_address(),
        metadata: request.metadata(),
    };
    Ok(serde_json::to_string(&body)?)
}

pub fn decode_customer_json_response(json: &str) -> Result<Customer, TransportError> {
    let parsed: CustomerJson = serde_json::from_str(json)?;
    Ok(parsed.into())
}

pub fn decode_customer_list_json_response(json: &str) -> Result<CustomerList, TransportError> {
    let parsed: CustomerListJsonResponse = serde_json::from_str(json)?;
    Ok(CustomerList {
        customers: parsed.data.into_iter().map(Customer::from).collect(),
        total: parsed.count.and_then(TransportCount::into_u64).unwrap_or(0),
    })
}

pub fn decode_balance_json_response(json: &str) -> Result<Balance, TransportError> {
    let parsed: BalanceJsonResponse = serde_json::from_str(json)?;
    Ok(Balance {
        customer_id: parsed.customer_id.unwrap_or_default(),
        balance_usdc: parsed.balance_usdc.map(TransportDecimal::into_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_customer_uses_camel_case_and_skips_absent_fields() {
        let request = CreateCustomer::with_external_id("user_123").unwrap();
        let json = encode_create_customer_json(&request).unwrap();
        assert_eq!(json, r#"{"externalCustomerId":"user_123"}"#);

        let mut metadata = Metadata::new();
        metadata.insert("plan".to_owned(), "pro".to_owned());
        let request = CreateCustomer::new(Some("user_1".to_owned()), Some("0xabc".to_owned()))
            .unwrap()
            .with_metadata(metadata);
        let value: serde_json::Value =
            serde_json::from_str(&encode_create_customer_json(&request).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "externalCustomerId": "user_1",
                "onchainAddress": "0xabc",
                "metadata": {"plan": "pro"}
            })
        );
    }

    #[test]
    fn decode_customer_maps_all_fields() {
        let json = r#"
        {
          "id": "cus_1",
          "externalCustomerId": "user_123",
          "onchainAddress": "0xabc",
          "status": "LOW_BALANCE",
          "isInternal": true,
          "metadata": {"tier": "gold", "seats": 3},
          "createdAt": "2024-01-01T00:00:00Z",
          "updatedAt": "2024-01-02T00:00:00Z"
        }
        "#;

        let customer = decode_customer_json_response(json).unwrap();
        assert_eq!(customer.id, "cus_1");
        assert_eq!(customer.external_customer_id.as_deref(), Some("user_123"));
        assert_eq!(customer.onchain_address.as_deref(), Some("0xabc"));
        assert_eq!(customer.status, Some(CustomerStatus::LowBalance));
        assert!(customer.is_internal);
        assert_eq!(customer.metadata.get("seats").map(String::as_str), Some("3"));
        assert_eq!(customer.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(customer.updated_at.as_deref(), Some("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn decode_customer_defaults_missing_fields() {
        let customer = decode_customer_json_response(r#"{"id": "cus_2"}"#).unwrap();
        assert_eq!(customer.status, None);
        assert!(!customer.is_internal);
        assert!(customer.metadata.is_empty());
    }

    #[test]
    fn decode_customer_list_reads_data_and_count() {
        let json = r#"
        {
          "data": [{"id": "cus_1"}, {"id": "cus_2", "status": "ACTIVE"}],
          "count": 2
        }
        "#;

        let list = decode_customer_list_json_response(json).unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.customers.len(), 2);
        assert_eq!(list.customers[1].status, Some(CustomerStatus::Active));

        let empty = decode_customer_list_json_response("{}").unwrap();
        assert!(empty.customers.is_empty());
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn decode_balance_supports_numeric_and_string_values() {
        let numeric = r#"{"customerId": "cus_1", "balanceUsdc": 10.50}"#;
        let parsed = decode_balance_json_response(numeric).unwrap();
        assert_eq!(parsed.customer_id, "cus_1");
        assert_eq!(parsed.balance_usdc.as_deref(), Some("10.50"));

        let string = r#"{"customerId": "cus_1", "balanceUsdc": "10.50"}"#;
        let parsed = decode_balance_json_response(string).unwrap();
        assert_eq!(parsed.balance_usdc.as_deref(), Some("10.50"));
    }
}
