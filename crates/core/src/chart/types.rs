//! Account domain types.

use std::fmt;
use std::str::FromStr;

use neraca_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ChartError;

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Resources owned (cash, receivables, inventory, fixed assets).
    Asset,
    /// Offsets an asset (accumulated depreciation, allowances).
    ContraAsset,
    /// Obligations owed to others.
    Liability,
    /// Owner's capital.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in statement order.
    pub const ALL: [Self; 6] = [
        Self::Asset,
        Self::ContraAsset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Direction in which this account type naturally increases.
    ///
    /// Only Asset and Expense are debit-normal. ContraAsset is credit-normal.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::ContraAsset | Self::Liability | Self::Equity | Self::Revenue => {
                NormalBalance::Credit
            }
        }
    }

    /// Sign applied to `debit - credit` activity: `+1` or `-1`.
    #[must_use]
    pub const fn sign(self) -> Decimal {
        match self.normal_balance() {
            NormalBalance::Debit => Decimal::ONE,
            NormalBalance::Credit => Decimal::NEGATIVE_ONE,
        }
    }

    /// Returns true for types that appear on the balance sheet.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(
            self,
            Self::Asset | Self::ContraAsset | Self::Liability | Self::Equity
        )
    }

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::ContraAsset => "contra_asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = ChartError;

    /// Accepts the storage form (`contra_asset`) as well as display forms
    /// such as `Contra Asset` or `ContraAsset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "asset" => Ok(Self::Asset),
            "contraasset" => Ok(Self::ContraAsset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(ChartError::UnknownAccountType(s.to_string())),
        }
    }
}

/// Normal balance side of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (ContraAsset, Liability, Equity, Revenue).
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change for a debit/credit pair.
    ///
    /// - Debit-normal: `debit - credit`
    /// - Credit-normal: `credit - debit`
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Hierarchical code, e.g. `1-1100`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Direct parent, if any.
    pub parent_id: Option<AccountId>,
    /// Opening balance, signed per the normal balance.
    pub opening_balance: Decimal,
    /// Inactive accounts are left out of reports.
    pub is_active: bool,
    /// Explicit current/non-current classification. Inferred from the code when absent.
    pub is_current: Option<bool>,
}

impl Account {
    /// Creates an active root account with a zero opening balance.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: AccountId::new(),
            code: code.into(),
            name: name.into(),
            account_type,
            parent_id: None,
            opening_balance: Decimal::ZERO,
            is_active: true,
            is_current: None,
        }
    }

    /// Sets the parent link.
    #[must_use]
    pub fn with_parent(mut self, parent_id: AccountId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Sets the opening balance.
    #[must_use]
    pub fn with_opening_balance(mut self, opening_balance: Decimal) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    /// Sets an explicit current/non-current classification.
    #[must_use]
    pub fn with_current(mut self, is_current: bool) -> Self {
        self.is_current = Some(is_current);
        self
    }

    /// Marks the account inactive.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Current/non-current classification, explicit or inferred from the code.
    ///
    /// Returns `None` for accounts that are neither asset nor liability, or
    /// whose code matches no known prefix.
    #[must_use]
    pub fn current_classification(&self) -> Option<bool> {
        self.is_current
            .or_else(|| infer_current_classification(&self.code, self.account_type))
    }
}

const CURRENT_ASSET_PREFIXES: &[&str] = &["1-1", "1.1", "11", "10", "101", "110"];
const NON_CURRENT_ASSET_PREFIXES: &[&str] = &["1-2", "1.2", "12", "13", "120", "130"];
const CURRENT_LIABILITY_PREFIXES: &[&str] = &["2-1", "2.1", "21", "210"];
const NON_CURRENT_LIABILITY_PREFIXES: &[&str] = &["2-2", "2.2", "22", "230", "24"];

/// Infers whether an account is current from its code.
#[must_use]
pub fn infer_current_classification(code: &str, account_type: AccountType) -> Option<bool> {
    let (current, non_current) = match account_type {
        AccountType::Asset | AccountType::ContraAsset => {
            (CURRENT_ASSET_PREFIXES, NON_CURRENT_ASSET_PREFIXES)
        }
        AccountType::Liability => (CURRENT_LIABILITY_PREFIXES, NON_CURRENT_LIABILITY_PREFIXES),
        _ => return None,
    };

    if current.iter().any(|p| code_has_prefix(code, p)) {
        Some(true)
    } else if non_current.iter().any(|p| code_has_prefix(code, p)) {
        Some(false)
    } else {
        None
    }
}

/// Separator prefixes (`1-1`) match the raw code; digit-only prefixes
/// (`110`) match the code with separators stripped.
fn code_has_prefix(code: &str, prefix: &str) -> bool {
    if prefix.chars().all(|c| c.is_ascii_digit()) {
        let digits: String = code.chars().filter(char::is_ascii_digit).collect();
        digits.starts_with(prefix)
    } else {
        code.starts_with(prefix)
    }
}
