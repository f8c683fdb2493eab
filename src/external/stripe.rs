use crate::config::{CheckoutConfig, StripeConfig};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::str::FromStr;
use stripe::{
    CheckoutSession, CheckoutSessionId, CheckoutSessionMode, CheckoutSessionPaymentStatus,
    Client, CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData, CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionPaymentMethodTypes, Currency,
};

/// A single-line hosted checkout: the whole amount is charged as one item.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedCheckoutRequest {
    pub line_item_name: String,
    pub amount: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostedSession {
    pub id: String,
    pub url: Option<String>,
    pub paid: bool,
    pub amount_total: Option<i64>,
    pub metadata: HashMap<String, String>,
}

/// Hosted checkout provider. Stripe in production, an in-memory fake in tests.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(&self, request: HostedCheckoutRequest) -> AppResult<HostedSession>;

    async fn retrieve_session(&self, session_id: &str) -> AppResult<HostedSession>;
}

#[derive(Clone)]
pub struct StripeService {
    client: Client,
}

impl StripeService {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: Client::new(config.secret_key.clone()),
        }
    }
}

pub fn parse_currency(code: &str) -> AppResult<Currency> {
    Currency::from_str(&code.to_ascii_lowercase())
        .map_err(|_| AppError::ConfigError(format!("Unsupported currency: {code}")))
}

/// `<client>/success?session_id={CHECKOUT_SESSION_ID}`; Stripe substitutes the placeholder.
pub fn success_url(frontend_url: &str) -> String {
    format!(
        "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
        frontend_url.trim_end_matches('/')
    )
}

pub fn cancel_url(frontend_url: &str) -> String {
    format!("{}/cart", frontend_url.trim_end_matches('/'))
}

impl HostedCheckoutRequest {
    pub fn new(
        checkout: &CheckoutConfig,
        frontend_url: &str,
        line_item_name: impl Into<String>,
        amount: i64,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            line_item_name: line_item_name.into(),
            amount,
            currency: checkout.currency.clone(),
            success_url: success_url(frontend_url),
            cancel_url: cancel_url(frontend_url),
            metadata,
        }
    }
}

impl From<CheckoutSession> for HostedSession {
    fn from(session: CheckoutSession) -> Self {
        Self {
            id: session.id.to_string(),
            url: session.url,
            paid: session.payment_status == CheckoutSessionPaymentStatus::Paid,
            amount_total: session.amount_total,
            metadata: session.metadata.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl CheckoutGateway for StripeService {
    async fn create_session(&self, request: HostedCheckoutRequest) -> AppResult<HostedSession> {
        let currency = parse_currency(&request.currency)?;

        let mut params = CreateCheckoutSession::new();
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.mode = Some(CheckoutSessionMode::Payment);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.metadata = Some(request.metadata.clone());
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency,
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: request.line_item_name.clone(),
                    ..Default::default()
                }),
                unit_amount: Some(request.amount),
                ..Default::default()
            }),
            quantity: Some(1),
            ..Default::default()
        }]);

        let session = CheckoutSession::create(&self.client, params).await?;
        log::info!(
            "Created checkout session {} for {} {}",
            session.id,
            request.amount,
            request.currency
        );
        Ok(HostedSession::from(session))
    }

    async fn retrieve_session(&self, session_id: &str) -> AppResult<HostedSession> {
        let id = CheckoutSessionId::from_str(session_id)
            .map_err(|_| AppError::ValidationError("Invalid session_id".to_string()))?;
        let session = CheckoutSession::retrieve(&self.client, &id, &[]).await?;
        Ok(HostedSession::from(session))
    }
}
