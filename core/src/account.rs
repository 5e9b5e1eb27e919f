//! Account resource: attributes, client-side validation and the CRUD calls.

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::context::CallContext;
use crate::envelope::{Links, Record};
use crate::error::Error;
use crate::http::HttpMethod;
use crate::list::ListOptions;
use crate::request::Request;

pub const ACCOUNTS_PATH: &str = "/v1/organisation/accounts";
pub const ACCOUNTS_TYPE: &str = "accounts";

/// Account attributes. Empty optional fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub country: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub base_currency: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub account_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bank_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bank_id_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bic: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iban: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternative_names: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub account_classification: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secondary_identification: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "is_false")]
    pub joint_account: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub account_matching_opt_out: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub switched: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Client-side rejection of account attributes. Never sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("country should match '^[A-Z]{{2}}$'")]
    InvalidCountry,
    #[error("base_currency should match '^[A-Z]{{3}}$'")]
    InvalidBaseCurrency,
    #[error("bank_id should match '^[A-Z0-9]{{0,16}}$'")]
    InvalidBankId,
    #[error("bank_id_code should match '^[A-Z0-9]{{0,16}}$'")]
    InvalidBankIdCode,
    #[error("bic should match '^([A-Z]{{6}}[A-Z0-9]{{2}}|[A-Z]{{6}}[A-Z0-9]{{5}})$'")]
    InvalidBic,
    #[error("account_classification should be one of [Personal Business]")]
    InvalidAccountClassification,
}

/// Format checks run before `create_account` sends anything.
///
/// Deliberately looser than the server: only fields with a known format are
/// checked, and optional fields only when set. The first failing check wins.
#[derive(Debug, Clone)]
pub struct AccountValidator {
    country: Regex,
    currency: Regex,
    bank_id: Regex,
    bank_id_code: Regex,
    bic: Regex,
}

impl AccountValidator {
    pub fn new() -> Self {
        Self {
            country: Regex::new(r"^[A-Z]{2}$").unwrap(),
            currency: Regex::new(r"^[A-Z]{3}$").unwrap(),
            bank_id: Regex::new(r"^[A-Z0-9]{0,16}$").unwrap(),
            bank_id_code: Regex::new(r"^[A-Z0-9]{0,16}$").unwrap(),
            bic: Regex::new(r"^([A-Z]{6}[A-Z0-9]{2}|[A-Z]{6}[A-Z0-9]{5})$").unwrap(),
        }
    }

    pub fn validate(&self, account: &Account) -> Result<(), ValidationError> {
        let set = |s: &String| !s.is_empty();

        if !self.country.is_match(&account.country) {
            return Err(ValidationError::InvalidCountry);
        }
        if set(&account.base_currency) && !self.currency.is_match(&account.base_currency) {
            return Err(ValidationError::InvalidBaseCurrency);
        }
        if set(&account.bank_id) && !self.bank_id.is_match(&account.bank_id) {
            return Err(ValidationError::InvalidBankId);
        }
        if set(&account.bank_id_code) && !self.bank_id_code.is_match(&account.bank_id_code) {
            return Err(ValidationError::InvalidBankIdCode);
        }
        if set(&account.bic) && !self.bic.is_match(&account.bic) {
            return Err(ValidationError::InvalidBic);
        }
        if set(&account.account_classification)
            && !matches!(account.account_classification.as_str(), "Personal" | "Business")
        {
            return Err(ValidationError::InvalidAccountClassification);
        }
        Ok(())
    }
}

impl Default for AccountValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Create an account owned by `organisation_id`. The id is generated here.
    pub async fn create_account(
        &self,
        ctx: &CallContext,
        organisation_id: Uuid,
        account: &Account,
    ) -> Result<Record<Account>, Error> {
        self.config().account_validator().validate(account)?;

        let mut created = None;
        let request = Request::new(ACCOUNTS_PATH)
            .method(HttpMethod::Post)
            .resource_type(ACCOUNTS_TYPE)
            .organisation_id(organisation_id)
            .id(Uuid::new_v4())
            .payload(account)
            .expected_status(201)
            .decode_into(&mut created);
        self.dispatch(ctx, request).await?;

        created.ok_or_else(|| self.missing_record(ACCOUNTS_PATH))
    }

    pub async fn fetch_account(&self, ctx: &CallContext, id: Uuid) -> Result<Record<Account>, Error> {
        let path = format!("{ACCOUNTS_PATH}/{id}");
        let mut fetched = None;
        let request = Request::new(path.as_str())
            .resource_type(ACCOUNTS_TYPE)
            .decode_into(&mut fetched);
        self.dispatch(ctx, request).await?;

        fetched.ok_or_else(|| self.missing_record(&path))
    }

    /// List accounts in server order, one page at a time.
    pub async fn list_accounts(
        &self,
        ctx: &CallContext,
        options: &ListOptions,
    ) -> Result<Vec<Record<Account>>, Error> {
        self.list_accounts_page(ctx, options)
            .await
            .map(|(accounts, _)| accounts)
    }

    /// Like `list_accounts`, also returning the page's navigation links
    /// (`self`, `first`, `last`, …) as paths relative to the base URL.
    pub async fn list_accounts_page(
        &self,
        ctx: &CallContext,
        options: &ListOptions,
    ) -> Result<(Vec<Record<Account>>, Links), Error> {
        let mut accounts = Vec::new();
        let mut links = Links::new();
        let request = options
            .apply(Request::new(ACCOUNTS_PATH).resource_type(ACCOUNTS_TYPE))
            .decode_each(|account: Record<Account>| accounts.push(account))
            .links_into(&mut links);
        self.dispatch(ctx, request).await?;

        Ok((accounts, links))
    }

    /// Delete the account `id` at `version`.
    ///
    /// A version that does not exist yields `NotFound`, not `Conflict`: that is
    /// what the server actually answers, although its documentation says 409.
    pub async fn delete_account(&self, ctx: &CallContext, id: Uuid, version: u64) -> Result<(), Error> {
        let request = Request::new(format!("{ACCOUNTS_PATH}/{id}"))
            .method(HttpMethod::Delete)
            .resource_type(ACCOUNTS_TYPE)
            .query("version", version)
            .expected_status(204);
        self.dispatch(ctx, request).await
    }

    // A successful single-record decode always fills its slot.
    fn missing_record(&self, path: &str) -> Error {
        Error::Decoding {
            url: format!("{}{path}", self.config().base_url()),
            source: serde_json::Error::custom("response carried no record"),
        }
    }
}
