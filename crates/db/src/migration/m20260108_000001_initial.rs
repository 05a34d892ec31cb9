//! Initial database migration.
//!
//! Creates the chart of accounts, journal lines, open balances and the
//! ageing record cache.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 2: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 3: RECEIVABLES & PAYABLES
        // ============================================================
        db.execute_unprepared(OPEN_BALANCES_SQL).await?;
        db.execute_unprepared(AGEING_RECORDS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    account_type VARCHAR(20) NOT NULL CHECK (
        account_type IN ('asset', 'contra_asset', 'liability', 'equity', 'revenue', 'expense')
    ),
    parent_id UUID REFERENCES accounts(id),
    opening_balance NUMERIC(20, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    is_current BOOLEAN,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX idx_accounts_type ON accounts(account_type) WHERE is_active = true;
CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id),
    date DATE NOT NULL,
    debit NUMERIC(20, 4) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(20, 4) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    description TEXT NOT NULL DEFAULT '',
    journal_type VARCHAR(20) NOT NULL DEFAULT 'general',
    transaction_group_id UUID,
    source JSONB,
    reference VARCHAR(100),
    branch_id UUID,
    department_id UUID,
    project_id UUID,
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (debit = 0 OR credit = 0)
);

CREATE INDEX idx_journal_lines_account_date ON journal_lines(account_id, date)
    WHERE deleted_at IS NULL;
CREATE INDEX idx_journal_lines_group ON journal_lines(transaction_group_id)
    WHERE transaction_group_id IS NOT NULL AND deleted_at IS NULL;
CREATE INDEX idx_journal_lines_branch ON journal_lines(branch_id)
    WHERE branch_id IS NOT NULL;
";

const OPEN_BALANCES_SQL: &str = r"
CREATE TABLE open_balances (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    kind VARCHAR(20) NOT NULL CHECK (kind IN ('receivable', 'payable')),
    party VARCHAR(255) NOT NULL,
    document_number VARCHAR(100) NOT NULL,
    invoice_date DATE NOT NULL,
    due_date DATE NOT NULL,
    remaining NUMERIC(20, 4) NOT NULL DEFAULT 0,
    branch_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_open_balances_kind ON open_balances(kind) WHERE remaining > 0;
";

const AGEING_RECORDS_SQL: &str = r"
CREATE TABLE ageing_records (
    open_balance_id UUID PRIMARY KEY REFERENCES open_balances(id) ON DELETE CASCADE,
    invoice_date DATE NOT NULL,
    due_date DATE NOT NULL,
    days_outstanding BIGINT NOT NULL,
    bucket VARCHAR(10) NOT NULL CHECK (bucket IN ('Current', '31-60', '61-90', '>90')),
    computed_as_of DATE NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ageing_records;
DROP TABLE IF EXISTS open_balances;
DROP TABLE IF EXISTS journal_lines;
DROP TABLE IF EXISTS accounts;
";
