//! Originating documents of journal lines.
//!
//! A line's source is a closed set of document kinds, each carrying a typed
//! payload. Looking up the document itself goes through [`SourceResolver`];
//! the storage layer resolves invoices from stored open balances.

use std::fmt;

use chrono::NaiveDate;
use neraca_shared::types::{DocumentId, TransactionGroupId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::LedgerError;
use super::types::JournalLine;

/// Reference from a journal line to the business event that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRef {
    /// Sales invoice issued to a customer.
    SalesInvoice {
        /// Invoice id.
        document_id: DocumentId,
        /// Invoice number.
        number: String,
    },
    /// Purchase invoice received from a vendor.
    PurchaseInvoice {
        /// Invoice id.
        document_id: DocumentId,
        /// Invoice number.
        number: String,
    },
    /// Payment received from a customer.
    CustomerReceipt {
        /// Receipt id.
        document_id: DocumentId,
        /// Receipt number.
        number: String,
    },
    /// Payment made to a vendor.
    VendorPayment {
        /// Payment id.
        document_id: DocumentId,
        /// Payment number.
        number: String,
    },
    /// Goods shipped to a customer.
    DeliveryOrder {
        /// Delivery order id.
        document_id: DocumentId,
        /// Delivery order number.
        number: String,
    },
    /// Goods received from a vendor.
    PurchaseReceipt {
        /// Receipt id.
        document_id: DocumentId,
        /// Receipt number.
        number: String,
    },
    /// Manual journal with a free-form reference.
    Manual {
        /// Reference text.
        reference: String,
    },
    /// Reconciliation correction of a transaction group.
    Correction {
        /// Group that was corrected.
        transaction_group_id: TransactionGroupId,
    },
}

/// Kind of a [`SourceRef`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Sales invoice.
    SalesInvoice,
    /// Purchase invoice.
    PurchaseInvoice,
    /// Customer receipt.
    CustomerReceipt,
    /// Vendor payment.
    VendorPayment,
    /// Delivery order.
    DeliveryOrder,
    /// Purchase receipt.
    PurchaseReceipt,
    /// Manual journal.
    Manual,
    /// Reconciliation correction.
    Correction,
}

impl SourceKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SalesInvoice => "sales_invoice",
            Self::PurchaseInvoice => "purchase_invoice",
            Self::CustomerReceipt => "customer_receipt",
            Self::VendorPayment => "vendor_payment",
            Self::DeliveryOrder => "delivery_order",
            Self::PurchaseReceipt => "purchase_receipt",
            Self::Manual => "manual",
            Self::Correction => "correction",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SourceRef {
    /// Kind of this source.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::SalesInvoice { .. } => SourceKind::SalesInvoice,
            Self::PurchaseInvoice { .. } => SourceKind::PurchaseInvoice,
            Self::CustomerReceipt { .. } => SourceKind::CustomerReceipt,
            Self::VendorPayment { .. } => SourceKind::VendorPayment,
            Self::DeliveryOrder { .. } => SourceKind::DeliveryOrder,
            Self::PurchaseReceipt { .. } => SourceKind::PurchaseReceipt,
            Self::Manual { .. } => SourceKind::Manual,
            Self::Correction { .. } => SourceKind::Correction,
        }
    }

    /// Id of the external document, for kinds backed by one.
    #[must_use]
    pub fn document_id(&self) -> Option<DocumentId> {
        match self {
            Self::SalesInvoice { document_id, .. }
            | Self::PurchaseInvoice { document_id, .. }
            | Self::CustomerReceipt { document_id, .. }
            | Self::VendorPayment { document_id, .. }
            | Self::DeliveryOrder { document_id, .. }
            | Self::PurchaseReceipt { document_id, .. } => Some(*document_id),
            Self::Manual { .. } | Self::Correction { .. } => None,
        }
    }

    /// Reference shown to users: document number, manual reference, or group id.
    #[must_use]
    pub fn display_reference(&self) -> String {
        match self {
            Self::SalesInvoice { number, .. }
            | Self::PurchaseInvoice { number, .. }
            | Self::CustomerReceipt { number, .. }
            | Self::VendorPayment { number, .. }
            | Self::DeliveryOrder { number, .. }
            | Self::PurchaseReceipt { number, .. } => number.clone(),
            Self::Manual { reference } => reference.clone(),
            Self::Correction {
                transaction_group_id,
            } => format!("CORRECTION-{transaction_group_id}"),
        }
    }
}

/// Summary of a resolved source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Kind of document.
    pub kind: SourceKind,
    /// Document number.
    pub number: String,
    /// Customer or vendor name, where applicable.
    pub party: Option<String>,
    /// Document date.
    pub date: Option<NaiveDate>,
    /// Amount still outstanding on the document, where known.
    pub amount: Option<Decimal>,
}

/// Looks up the document behind a typed source reference.
#[cfg_attr(test, mockall::automock)]
pub trait SourceResolver {
    /// Returns the document, or `None` if it no longer exists.
    fn resolve(&self, source: &SourceRef) -> Option<SourceDocument>;
}

/// Resolves a source, reporting missing documents as errors.
///
/// Manual and correction sources carry everything needed and never reach
/// the resolver.
///
/// # Errors
///
/// Returns `LedgerError::SourceNotFound` when the resolver has no document.
pub fn resolve_source<R: SourceResolver + ?Sized>(
    resolver: &R,
    source: &SourceRef,
) -> Result<SourceDocument, LedgerError> {
    match source {
        SourceRef::Manual { .. } | SourceRef::Correction { .. } => Ok(SourceDocument {
            kind: source.kind(),
            number: source.display_reference(),
            party: None,
            date: None,
            amount: None,
        }),
        _ => resolver
            .resolve(source)
            .ok_or_else(|| LedgerError::SourceNotFound {
                kind: source.kind(),
                reference: source.display_reference(),
            }),
    }
}

/// A journal line with the document behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcedLine {
    /// The line itself.
    #[serde(flatten)]
    pub line: JournalLine,
    /// Resolved source, absent for unsourced or unresolvable lines.
    pub source_document: Option<SourceDocument>,
}

/// Resolves the sources of a batch of lines.
///
/// A missing document leaves its line unresolved and adds a warning; the
/// other lines still resolve.
pub fn resolve_lines<R: SourceResolver + ?Sized>(
    resolver: &R,
    lines: Vec<JournalLine>,
) -> (Vec<SourcedLine>, Vec<String>) {
    let mut warnings = Vec::new();
    let sourced = lines
        .into_iter()
        .map(|line| {
            let source_document = line.source.as_ref().and_then(|source| {
                resolve_source(resolver, source)
                    .inspect_err(|e| {
                        warn!(line_id = %line.id, error = %e, "Source document unavailable");
                        warnings.push(e.to_string());
                    })
                    .ok()
            });
            SourcedLine {
                line,
                source_document,
            }
        })
        .collect();
    (sourced, warnings)
}
