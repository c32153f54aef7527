//! Account DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_ledger::{Account, AccountKind, AccountPatch};

#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub kind: AccountKind,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<CreateAccountRequest> for Account {
    fn from(request: CreateAccountRequest) -> Self {
        Account {
            code: request.code,
            name: request.name,
            kind: request.kind,
            description: request.description,
            active: request.active,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

impl From<UpdateAccountRequest> for AccountPatch {
    fn from(request: UpdateAccountRequest) -> Self {
        AccountPatch {
            name: request.name,
            kind: request.kind,
            description: request.description,
            active: request.active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub inserted: usize,
}
