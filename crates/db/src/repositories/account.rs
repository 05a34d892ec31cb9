//! Account repository for chart of accounts database operations.

use chrono::Utc;
use neraca_core::chart::{Account, AccountType, ChartError, ChartOfAccounts};
use neraca_shared::types::AccountId;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::info;

use super::error::RepositoryError;
use crate::entities::accounts;

/// Converts a stored row into a domain account.
fn to_account(model: accounts::Model) -> Result<Account, RepositoryError> {
    let account_type = model.account_type.parse::<AccountType>().map_err(|_| {
        RepositoryError::InvalidStoredValue {
            table: "accounts",
            column: "account_type",
            value: model.account_type.clone(),
        }
    })?;

    Ok(Account {
        id: AccountId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        account_type,
        parent_id: model.parent_id.map(AccountId::from_uuid),
        opening_balance: model.opening_balance,
        is_active: model.is_active,
        is_current: model.is_current,
    })
}

/// Repository for the chart of accounts.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads every account into a validated registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails, a row holds an unknown account
    /// type, or the stored hierarchy is inconsistent.
    pub async fn load_chart(&self) -> Result<ChartOfAccounts, RepositoryError> {
        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_account)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ChartOfAccounts::from_accounts(accounts)?)
    }

    /// Inserts an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (duplicate code, unknown parent).
    pub async fn create(&self, account: &Account) -> Result<AccountId, RepositoryError> {
        let now = Utc::now().into();
        accounts::ActiveModel {
            id: Set(account.id.into_inner()),
            code: Set(account.code.clone()),
            name: Set(account.name.clone()),
            account_type: Set(account.account_type.as_str().to_string()),
            parent_id: Set(account.parent_id.map(AccountId::into_inner)),
            opening_balance: Set(account.opening_balance),
            is_active: Set(account.is_active),
            is_current: Set(account.is_current),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(account.id)
    }

    /// Sets an account's opening balance, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `ChartError::AccountNotFound` for unknown accounts.
    pub async fn set_opening_balance(
        &self,
        id: AccountId,
        amount: Decimal,
    ) -> Result<Decimal, RepositoryError> {
        let model = self.find(id).await?;
        let previous = model.opening_balance;

        let mut active: accounts::ActiveModel = model.into();
        active.opening_balance = Set(amount);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        info!(account_id = %id, %previous, %amount, "Opening balance updated");
        Ok(previous)
    }

    /// Activates or deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `ChartError::AccountNotFound` for unknown accounts.
    pub async fn set_active(&self, id: AccountId, is_active: bool) -> Result<(), RepositoryError> {
        let mut active: accounts::ActiveModel = self.find(id).await?.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        info!(account_id = %id, is_active, "Account active flag updated");
        Ok(())
    }

    async fn find(&self, id: AccountId) -> Result<accounts::Model, RepositoryError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| ChartError::AccountNotFound(id).into())
    }
}
