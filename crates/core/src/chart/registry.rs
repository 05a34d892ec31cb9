//! Chart of accounts registry.

use std::collections::{HashMap, HashSet};

use neraca_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ChartError;
use super::types::{Account, AccountType};

/// In-memory chart of accounts, ordered by code.
///
/// Every parent link resolves to an account in the registry and the parent
/// graph is acyclic.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: Vec<Account>,
    by_id: HashMap<AccountId, usize>,
    by_code: HashMap<String, usize>,
}

/// Result of checking the chart for the classifications reports rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// True when no issue was found.
    pub is_valid: bool,
    /// Human-readable issues.
    pub issues: Vec<String>,
    /// Number of active Asset/ContraAsset accounts.
    pub asset_accounts: usize,
    /// Assets classified current.
    pub current_asset_accounts: usize,
    /// Number of active Liability accounts.
    pub liability_accounts: usize,
    /// Liabilities classified current.
    pub current_liability_accounts: usize,
    /// Number of active Equity accounts.
    pub equity_accounts: usize,
}

impl ChartOfAccounts {
    /// Creates an empty chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chart from a full set of accounts.
    ///
    /// Accounts may arrive in any order; parents are resolved after all
    /// accounts are indexed.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate codes, dangling parent links or cycles.
    pub fn from_accounts(accounts: Vec<Account>) -> Result<Self, ChartError> {
        let mut accounts = accounts;
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let mut chart = Self {
            accounts,
            ..Self::default()
        };
        chart.reindex()?;

        for account in &chart.accounts {
            chart.check_parent(account)?;
        }
        Ok(chart)
    }

    /// Adds one account to the chart.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken or the parent does not exist.
    pub fn insert(&mut self, account: Account) -> Result<AccountId, ChartError> {
        if self.by_code.contains_key(&account.code) {
            return Err(ChartError::DuplicateCode(account.code));
        }
        self.check_parent(&account)?;

        let id = account.id;
        let position = self
            .accounts
            .partition_point(|existing| existing.code < account.code);
        self.accounts.insert(position, account);
        self.reindex()?;
        Ok(id)
    }

    fn reindex(&mut self) -> Result<(), ChartError> {
        self.by_id.clear();
        self.by_code.clear();
        for (index, account) in self.accounts.iter().enumerate() {
            if self.by_code.insert(account.code.clone(), index).is_some() {
                return Err(ChartError::DuplicateCode(account.code.clone()));
            }
            self.by_id.insert(account.id, index);
        }
        Ok(())
    }

    fn check_parent(&self, account: &Account) -> Result<(), ChartError> {
        let Some(parent) = account.parent_id else {
            return Ok(());
        };
        if !self.by_id.contains_key(&parent) {
            return Err(ChartError::ParentNotFound {
                code: account.code.clone(),
                parent,
            });
        }

        let mut seen = HashSet::from([account.id]);
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if !seen.insert(id) {
                return Err(ChartError::CyclicParent(account.code.clone()));
            }
            cursor = self.get(id).and_then(|a| a.parent_id);
        }
        Ok(())
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the chart has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Looks up an account by id.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.by_id.get(&id).map(|&index| &self.accounts[index])
    }

    /// Looks up an account by id, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns `ChartError::AccountNotFound` if the id is unknown.
    pub fn require(&self, id: AccountId) -> Result<&Account, ChartError> {
        self.get(id).ok_or(ChartError::AccountNotFound(id))
    }

    /// Looks up an account by code.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&Account> {
        self.by_code.get(code).map(|&index| &self.accounts[index])
    }

    /// All accounts in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    /// Active accounts of the given types, in code order.
    pub fn active_of_types<'a>(
        &'a self,
        types: &'a [AccountType],
    ) -> impl Iterator<Item = &'a Account> + 'a {
        self.accounts
            .iter()
            .filter(move |a| a.is_active && types.contains(&a.account_type))
    }

    /// Accounts of the given types regardless of the active flag.
    pub fn of_types<'a>(
        &'a self,
        types: &'a [AccountType],
    ) -> impl Iterator<Item = &'a Account> + 'a {
        self.accounts
            .iter()
            .filter(move |a| types.contains(&a.account_type))
    }

    /// Direct children of an account.
    pub fn children_of(&self, id: AccountId) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .filter(move |a| a.parent_id == Some(id))
    }

    /// Returns true if at least one account points to `id` as its parent.
    #[must_use]
    pub fn has_children(&self, id: AccountId) -> bool {
        self.children_of(id).next().is_some()
    }

    /// Sum of opening balances over active accounts of the given types.
    #[must_use]
    pub fn opening_total(&self, types: &[AccountType]) -> Decimal {
        self.active_of_types(types).map(|a| a.opening_balance).sum()
    }

    /// Replaces an account's opening balance and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns `ChartError::AccountNotFound` if the id is unknown.
    pub fn set_opening_balance(
        &mut self,
        id: AccountId,
        opening_balance: Decimal,
    ) -> Result<Decimal, ChartError> {
        let account = self.get_mut(id)?;
        Ok(std::mem::replace(
            &mut account.opening_balance,
            opening_balance,
        ))
    }

    /// Activates or deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `ChartError::AccountNotFound` if the id is unknown.
    pub fn set_active(&mut self, id: AccountId, is_active: bool) -> Result<(), ChartError> {
        self.get_mut(id)?.is_active = is_active;
        Ok(())
    }

    fn get_mut(&mut self, id: AccountId) -> Result<&mut Account, ChartError> {
        let index = *self.by_id.get(&id).ok_or(ChartError::AccountNotFound(id))?;
        Ok(&mut self.accounts[index])
    }

    /// Checks that the chart carries the classifications the balance sheet
    /// and its ratios depend on.
    #[must_use]
    pub fn validate_classification(&self) -> ClassificationReport {
        let assets: Vec<&Account> = self
            .active_of_types(&[AccountType::Asset, AccountType::ContraAsset])
            .collect();
        let liabilities: Vec<&Account> = self.active_of_types(&[AccountType::Liability]).collect();
        let equity_accounts = self.active_of_types(&[AccountType::Equity]).count();

        let current_asset_accounts = assets
            .iter()
            .filter(|a| a.current_classification() == Some(true))
            .count();
        let current_liability_accounts = liabilities
            .iter()
            .filter(|a| a.current_classification() == Some(true))
            .count();

        let mut issues = Vec::new();
        if assets.is_empty() {
            issues.push("No active asset accounts".to_string());
        } else if current_asset_accounts == 0 {
            issues.push("No asset account is classified as current".to_string());
        }
        if liabilities.is_empty() {
            issues.push("No active liability accounts".to_string());
        } else if current_liability_accounts == 0 {
            issues.push("No liability account is classified as current".to_string());
        }
        if equity_accounts == 0 {
            issues.push("No active equity accounts".to_string());
        }

        ClassificationReport {
            is_valid: issues.is_empty(),
            issues,
            asset_accounts: assets.len(),
            current_asset_accounts,
            liability_accounts: liabilities.len(),
            current_liability_accounts,
            equity_accounts,
        }
    }
}
