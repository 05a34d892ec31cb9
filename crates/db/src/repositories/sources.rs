//! Source document lookup backed by stored open balances.

use std::collections::HashMap;

use neraca_core::ageing::{BalanceKind, OpenBalance};
use neraca_core::ledger::{SourceDocument, SourceKind, SourceRef, SourceResolver};
use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::debug;

use super::ageing::to_open_balance;
use super::error::RepositoryError;
use crate::entities::open_balances;

/// Resolves invoice sources by document number.
///
/// Receivables stand for sales invoices and payables for purchase invoices.
/// Other document kinds are not stored here and never resolve.
#[derive(Debug, Clone, Default)]
pub struct InvoiceSourceResolver {
    documents: HashMap<(SourceKind, String), SourceDocument>,
}

impl InvoiceSourceResolver {
    /// Indexes open balances by invoice kind and number.
    #[must_use]
    pub fn from_open_balances(balances: &[OpenBalance]) -> Self {
        let documents = balances
            .iter()
            .map(|balance| {
                let kind = match balance.kind {
                    BalanceKind::Receivable => SourceKind::SalesInvoice,
                    BalanceKind::Payable => SourceKind::PurchaseInvoice,
                };
                let document = SourceDocument {
                    kind,
                    number: balance.document_number.clone(),
                    party: Some(balance.party.clone()),
                    date: Some(balance.invoice_date),
                    amount: Some(balance.remaining),
                };
                ((kind, balance.document_number.clone()), document)
            })
            .collect();
        Self { documents }
    }

    /// Number of indexed documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl SourceResolver for InvoiceSourceResolver {
    fn resolve(&self, source: &SourceRef) -> Option<SourceDocument> {
        self.documents
            .get(&(source.kind(), source.display_reference()))
            .cloned()
    }
}

/// Repository that builds source resolvers.
#[derive(Debug, Clone)]
pub struct SourceRepository {
    db: DatabaseConnection,
}

impl SourceRepository {
    /// Creates a new source repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads every stored invoice, settled ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn invoice_resolver(&self) -> Result<InvoiceSourceResolver, RepositoryError> {
        let balances = open_balances::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_open_balance)
            .collect::<Result<Vec<_>, _>>()?;

        let resolver = InvoiceSourceResolver::from_open_balances(&balances);
        debug!(documents = resolver.len(), "Loaded invoice sources");
        Ok(resolver)
    }
}
