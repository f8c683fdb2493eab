//! eSewa ePay v2: HMAC-signed redirect form and the signed callback blob.

use crate::config::EsewaConfig;
use crate::error::{AppError, AppResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Field order of the outgoing form signature.
pub const SIGNED_FIELD_NAMES: &str = "total_amount,transaction_uuid,product_code";

/// Fields a success callback must sign.
pub const CALLBACK_SIGNED_FIELDS: [&str; 6] = [
    "transaction_code",
    "status",
    "total_amount",
    "transaction_uuid",
    "product_code",
    "signed_field_names",
];

pub const STATUS_COMPLETE: &str = "COMPLETE";

/// Decoded and signature-checked success callback.
#[derive(Debug, Clone)]
pub struct EsewaCallback {
    pub status: String,
    pub transaction_uuid: String,
    pub total_amount: String,
    pub transaction_code: String,
    pub product_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsewaStatus {
    pub status: String,
    pub transaction_uuid: Option<String>,
    pub ref_id: Option<String>,
}

#[derive(Clone)]
pub struct EsewaService {
    http: Client,
    config: EsewaConfig,
}

/// `k1=v1,k2=v2,...` in the order given.
pub fn canonical_message<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    fields
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl EsewaService {
    pub fn new(config: EsewaConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn product_code(&self) -> &str {
        &self.config.product_code
    }

    pub fn form_url(&self) -> &str {
        &self.config.form_url
    }

    pub fn confirms_with_status_api(&self) -> bool {
        self.config.confirm_with_status_api
    }

    fn mac(&self) -> AppResult<HmacSha256> {
        HmacSha256::new_from_slice(self.config.secret_key.as_bytes())
            .map_err(|e| AppError::ConfigError(format!("Invalid eSewa secret: {e}")))
    }

    /// base64(HMAC-SHA256(secret, message))
    pub fn sign(&self, message: &str) -> AppResult<String> {
        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Signature for the outgoing payment form.
    pub fn sign_payment(&self, total_amount: &str, transaction_uuid: &str) -> AppResult<String> {
        let message = canonical_message([
            ("total_amount", total_amount),
            ("transaction_uuid", transaction_uuid),
            ("product_code", self.product_code()),
        ]);
        self.sign(&message)
    }

    fn verify_fields(&self, fields: &Map<String, Value>) -> AppResult<()> {
        let invalid = || AppError::ValidationError("Invalid eSewa signature".to_string());

        let names = fields
            .get("signed_field_names")
            .and_then(Value::as_str)
            .ok_or_else(invalid)?;
        let provided = fields
            .get("signature")
            .and_then(Value::as_str)
            .ok_or_else(invalid)?;
        let provided = STANDARD.decode(provided).map_err(|_| invalid())?;

        let signed: Vec<&str> = names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        if let Some(missing) = CALLBACK_SIGNED_FIELDS
            .iter()
            .find(|field| !signed.contains(*field))
        {
            log::warn!("eSewa callback does not sign {missing}");
            return Err(invalid());
        }

        let mut pairs = Vec::new();
        for name in signed {
            let value = fields.get(name).and_then(value_as_string).ok_or_else(invalid)?;
            pairs.push((name.to_string(), value));
        }
        let message = canonical_message(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        mac.verify_slice(&provided).map_err(|_| invalid())
    }

    /// Decodes the base64 `data` query value and checks its signature.
    pub fn decode_callback(&self, data: &str) -> AppResult<EsewaCallback> {
        let raw = STANDARD
            .decode(data.trim())
            .map_err(|_| AppError::ValidationError("Malformed eSewa data".to_string()))?;
        let fields: Map<String, Value> = serde_json::from_slice(&raw)
            .map_err(|_| AppError::ValidationError("Malformed eSewa data".to_string()))?;

        self.verify_fields(&fields)?;

        let field = |name: &str| fields.get(name).and_then(value_as_string);
        let required = |name: &str| {
            field(name).ok_or_else(|| AppError::ValidationError(format!("Missing {name}")))
        };

        Ok(EsewaCallback {
            status: required("status")?,
            transaction_uuid: required("transaction_uuid")?,
            total_amount: required("total_amount")?,
            transaction_code: required("transaction_code")?,
            product_code: required("product_code")?,
        })
    }

    /// Server-to-server confirmation against eSewa's status endpoint.
    pub async fn check_status(
        &self,
        transaction_uuid: &str,
        total_amount: &str,
    ) -> AppResult<EsewaStatus> {
        let response = self
            .http
            .get(&self.config.status_url)
            .query(&[
                ("product_code", self.product_code()),
                ("total_amount", total_amount),
                ("transaction_uuid", transaction_uuid),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApiError(format!(
                "eSewa status check failed ({code}): {body}"
            )));
        }

        Ok(response.json::<EsewaStatus>().await?)
    }
}
