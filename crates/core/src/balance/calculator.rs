//! Balance calculation service.

use std::collections::HashMap;

use chrono::NaiveDate;
use neraca_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chart::{Account, AccountType, ChartOfAccounts};
use crate::ledger::{JournalLedger, ScopeFilter};

/// Raw debit/credit activity on one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Total debit.
    pub debit: Decimal,
    /// Total credit.
    pub credit: Decimal,
}

impl Activity {
    /// `debit - credit`.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Activity per account for one `(as_of, scope)` cut, built in a single
/// pass over the ledger.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndex {
    as_of: Option<NaiveDate>,
    by_account: HashMap<AccountId, Activity>,
}

impl ActivityIndex {
    /// Date the index was cut at.
    #[must_use]
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    /// Activity on an account; zero if the account has no lines.
    #[must_use]
    pub fn activity(&self, account_id: AccountId) -> Activity {
        self.by_account
            .get(&account_id)
            .copied()
            .unwrap_or_default()
    }

    /// Summed activity over several accounts.
    #[must_use]
    pub fn activity_of<'a>(&self, accounts: impl IntoIterator<Item = &'a Account>) -> Activity {
        accounts
            .into_iter()
            .map(|a| self.activity(a.id))
            .fold(Activity::default(), |acc, a| Activity {
                debit: acc.debit + a.debit,
                credit: acc.credit + a.credit,
            })
    }
}

/// One account's balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account id.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Direct parent.
    pub parent_id: Option<AccountId>,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Total debit up to the cut.
    pub total_debit: Decimal,
    /// Total credit up to the cut.
    pub total_credit: Decimal,
    /// Signed balance.
    pub balance: Decimal,
}

/// Service for computing signed account balances.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Applies the account type's sign to raw activity on top of the opening balance.
    #[must_use]
    pub fn signed_balance(account: &Account, activity: Activity) -> Decimal {
        account.opening_balance + activity.net() * account.account_type.sign()
    }

    /// Activity on one account up to `as_of` within `scope`.
    #[must_use]
    pub fn activity(
        account_id: AccountId,
        ledger: &JournalLedger,
        as_of: NaiveDate,
        scope: &ScopeFilter,
    ) -> Activity {
        ledger
            .lines_at(as_of, scope)
            .filter(|l| l.account_id == account_id)
            .fold(Activity::default(), |acc, l| Activity {
                debit: acc.debit + l.debit,
                credit: acc.credit + l.credit,
            })
    }

    /// Signed balance of one account as of a date.
    #[must_use]
    pub fn balance(
        account: &Account,
        ledger: &JournalLedger,
        as_of: NaiveDate,
        scope: &ScopeFilter,
    ) -> Decimal {
        Self::signed_balance(account, Self::activity(account.id, ledger, as_of, scope))
    }

    /// Aggregates activity for every account in one pass.
    #[must_use]
    pub fn index(ledger: &JournalLedger, as_of: NaiveDate, scope: &ScopeFilter) -> ActivityIndex {
        let mut by_account: HashMap<AccountId, Activity> = HashMap::new();
        for line in ledger.lines_at(as_of, scope) {
            let entry = by_account.entry(line.account_id).or_default();
            entry.debit += line.debit;
            entry.credit += line.credit;
        }
        ActivityIndex {
            as_of: Some(as_of),
            by_account,
        }
    }

    /// Balance row for one account from a prebuilt index.
    #[must_use]
    pub fn account_balance(account: &Account, index: &ActivityIndex) -> AccountBalance {
        let activity = index.activity(account.id);
        AccountBalance {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            parent_id: account.parent_id,
            opening_balance: account.opening_balance,
            total_debit: activity.debit,
            total_credit: activity.credit,
            balance: Self::signed_balance(account, activity),
        }
    }

    /// Balance rows for the active accounts of the given types, in code order.
    #[must_use]
    pub fn balances_of_types(
        chart: &ChartOfAccounts,
        index: &ActivityIndex,
        types: &[AccountType],
    ) -> Vec<AccountBalance> {
        chart
            .active_of_types(types)
            .map(|account| Self::account_balance(account, index))
            .collect()
    }
}
