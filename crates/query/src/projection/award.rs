//! Award-level record shapes and their projection into [`NormalizedResult`].
//!
//! Award search and transaction search name the same concepts differently
//! ("Award Amount" vs "Transaction Amount", "Description" vs "Transaction
//! Description"). Each shape gets its own struct so the vocabularies never
//! mix, and each has a total `normalize` that never fails.
//!
//! Award-level "Start Date"/"End Date" are period-of-performance dates. They
//! land in `performance_start_date`/`performance_end_date` and never in
//! `signed_date`; only the award detail record carries a signing date.

use super::lenient::{self, CodeLabel};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields requested from `search/spending_by_award/`.
pub const AWARD_FIELDS: &[&str] = &[
    "Award ID",
    "Recipient Name",
    "Award Amount",
    "Description",
    "Start Date",
    "End Date",
    "Awarding Agency",
    "Awarding Sub Agency",
    "Contract Award Type",
    "NAICS",
    "PSC",
    "Place of Performance State Code",
    "recipient_id",
    "generated_internal_id",
];

/// Fields requested from `search/spending_by_transaction/`.
pub const TRANSACTION_FIELDS: &[&str] = &[
    "Award ID",
    "Mod",
    "Recipient Name",
    "Action Date",
    "Transaction Amount",
    "Transaction Description",
    "Awarding Agency",
    "Awarding Sub Agency",
    "Award Type",
    "NAICS",
    "PSC",
    "recipient_id",
    "generated_internal_id",
];

/// Minimal projection used by competition analysis, which only aggregates.
pub const COMPETITION_FIELDS: &[&str] = &[
    "Award ID",
    "Recipient Name",
    "Award Amount",
    "recipient_id",
    "Contract Award Type",
];

/// The single internal shape every award-like record is projected into.
///
/// Every field is optional; an absent upstream field stays absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    /// Human-readable award number (PIID / FAIN)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Generated unique award id, the key for detail lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awarding_agency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awarding_sub_agency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naics: Option<CodeLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psc: Option<CodeLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_of_performance_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_end_date: Option<String>,
    /// Date the transaction was executed (transaction records only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_number: Option<String>,
    /// Award signing date (award detail only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_award_id: Option<String>,
}

impl NormalizedResult {
    /// A base award: modification number "0", or blank/absent.
    pub fn is_base_award(&self) -> bool {
        match self.modification_number.as_deref().map(str::trim) {
            None | Some("") | Some("0") => true,
            Some(_) => false,
        }
    }
}

/// Keep only base-award transactions. Upstream has no such predicate, so the
/// filter runs client-side.
pub fn new_awards_only(results: Vec<NormalizedResult>) -> Vec<NormalizedResult> {
    results.into_iter().filter(|r| r.is_base_award()).collect()
}

/// A row from `search/spending_by_award/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwardRecord {
    #[serde(rename = "Award ID", default, deserialize_with = "lenient::string")]
    pub award_id: Option<String>,
    #[serde(rename = "generated_internal_id", default, deserialize_with = "lenient::string")]
    pub generated_internal_id: Option<String>,
    #[serde(rename = "Recipient Name", default, deserialize_with = "lenient::string")]
    pub recipient_name: Option<String>,
    #[serde(rename = "recipient_id", default, deserialize_with = "lenient::string")]
    pub recipient_id: Option<String>,
    #[serde(rename = "Award Amount", default, deserialize_with = "lenient::amount")]
    pub award_amount: Option<f64>,
    #[serde(rename = "Description", default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(rename = "Start Date", default, deserialize_with = "lenient::string")]
    pub start_date: Option<String>,
    #[serde(rename = "End Date", default, deserialize_with = "lenient::string")]
    pub end_date: Option<String>,
    #[serde(rename = "Awarding Agency", default, deserialize_with = "lenient::string")]
    pub awarding_agency: Option<String>,
    #[serde(rename = "Awarding Sub Agency", default, deserialize_with = "lenient::string")]
    pub awarding_sub_agency: Option<String>,
    #[serde(rename = "Contract Award Type", default, deserialize_with = "lenient::string")]
    pub contract_award_type: Option<String>,
    #[serde(rename = "NAICS", default, deserialize_with = "lenient::code")]
    pub naics: Option<CodeLabel>,
    #[serde(rename = "PSC", default, deserialize_with = "lenient::code")]
    pub psc: Option<CodeLabel>,
    #[serde(
        rename = "Place of Performance State Code",
        default,
        deserialize_with = "lenient::string"
    )]
    pub place_of_performance_state: Option<String>,
}

impl AwardRecord {
    pub fn normalize(self) -> NormalizedResult {
        NormalizedResult {
            id: self.award_id,
            internal_id: self.generated_internal_id,
            description: self.description,
            amount: self.award_amount,
            recipient_name: self.recipient_name,
            recipient_id: self.recipient_id,
            awarding_agency: self.awarding_agency,
            awarding_sub_agency: self.awarding_sub_agency,
            award_type: self.contract_award_type,
            naics: self.naics,
            psc: self.psc,
            place_of_performance_state: self.place_of_performance_state,
            performance_start_date: self.start_date,
            performance_end_date: self.end_date,
            ..Default::default()
        }
    }
}

/// A row from `search/spending_by_transaction/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "Award ID", default, deserialize_with = "lenient::string")]
    pub award_id: Option<String>,
    #[serde(rename = "Mod", default, deserialize_with = "lenient::raw_string")]
    pub modification_number: Option<String>,
    #[serde(rename = "generated_internal_id", default, deserialize_with = "lenient::string")]
    pub generated_internal_id: Option<String>,
    #[serde(rename = "Recipient Name", default, deserialize_with = "lenient::string")]
    pub recipient_name: Option<String>,
    #[serde(rename = "recipient_id", default, deserialize_with = "lenient::string")]
    pub recipient_id: Option<String>,
    #[serde(rename = "Action Date", default, deserialize_with = "lenient::string")]
    pub action_date: Option<String>,
    #[serde(rename = "Transaction Amount", default, deserialize_with = "lenient::amount")]
    pub transaction_amount: Option<f64>,
    #[serde(rename = "Transaction Description", default, deserialize_with = "lenient::string")]
    pub transaction_description: Option<String>,
    #[serde(rename = "Awarding Agency", default, deserialize_with = "lenient::string")]
    pub awarding_agency: Option<String>,
    #[serde(rename = "Awarding Sub Agency", default, deserialize_with = "lenient::string")]
    pub awarding_sub_agency: Option<String>,
    #[serde(rename = "Award Type", default, deserialize_with = "lenient::string")]
    pub award_type: Option<String>,
    #[serde(rename = "NAICS", default, deserialize_with = "lenient::code")]
    pub naics: Option<CodeLabel>,
    #[serde(rename = "PSC", default, deserialize_with = "lenient::code")]
    pub psc: Option<CodeLabel>,
}

impl TransactionRecord {
    pub fn normalize(self) -> NormalizedResult {
        NormalizedResult {
            id: self.award_id,
            internal_id: self.generated_internal_id,
            description: self.transaction_description,
            amount: self.transaction_amount,
            recipient_name: self.recipient_name,
            recipient_id: self.recipient_id,
            awarding_agency: self.awarding_agency,
            awarding_sub_agency: self.awarding_sub_agency,
            award_type: self.award_type,
            naics: self.naics,
            psc: self.psc,
            action_date: self.action_date,
            modification_number: self.modification_number,
            ..Default::default()
        }
    }
}

/// A child order from `idvs/activity/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdvChildRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub piid: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub generated_unique_award_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub parent_award_piid: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub recipient_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub recipient_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub awarding_agency: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub obligated_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub awarded_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub period_of_performance_start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub period_of_performance_potential_end_date: Option<String>,
}

impl IdvChildRecord {
    pub fn normalize(self) -> NormalizedResult {
        NormalizedResult {
            id: self.piid,
            internal_id: self.generated_unique_award_id,
            amount: self.obligated_amount.or(self.awarded_amount),
            recipient_name: self.recipient_name,
            recipient_id: self.recipient_id,
            awarding_agency: self.awarding_agency,
            performance_start_date: self.period_of_performance_start_date,
            performance_end_date: self.period_of_performance_potential_end_date,
            parent_award_id: self.parent_award_piid,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NamedRef {
    #[serde(default, deserialize_with = "lenient::string")]
    name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AgencyRef {
    #[serde(default, deserialize_with = "lenient::nested")]
    toptier_agency: Option<NamedRef>,
    #[serde(default, deserialize_with = "lenient::nested")]
    subtier_agency: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RecipientRef {
    #[serde(default, deserialize_with = "lenient::string")]
    recipient_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    recipient_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PeriodRef {
    #[serde(default, deserialize_with = "lenient::string")]
    start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LocationRef {
    #[serde(default, deserialize_with = "lenient::string")]
    state_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ContractDataRef {
    #[serde(default, deserialize_with = "lenient::string")]
    naics: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    naics_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    product_or_service_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    product_or_service_co_desc: Option<String>,
}

/// The record returned by `awards/{id}/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwardDetailRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    generated_unique_award_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    piid: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    fain: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    total_obligation: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    date_signed: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    type_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::nested")]
    recipient: Option<RecipientRef>,
    #[serde(default, deserialize_with = "lenient::nested")]
    awarding_agency: Option<AgencyRef>,
    #[serde(default, deserialize_with = "lenient::nested")]
    period_of_performance: Option<PeriodRef>,
    #[serde(default, deserialize_with = "lenient::nested")]
    place_of_performance: Option<LocationRef>,
    #[serde(default, deserialize_with = "lenient::nested")]
    latest_transaction_contract_data: Option<ContractDataRef>,
    #[serde(default, deserialize_with = "lenient::nested")]
    parent_award: Option<ParentRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ParentRef {
    #[serde(default, deserialize_with = "lenient::string")]
    piid: Option<String>,
}

impl AwardDetailRecord {
    pub fn normalize(self) -> NormalizedResult {
        let recipient = self.recipient.unwrap_or_default();
        let agency = self.awarding_agency.unwrap_or_default();
        let period = self.period_of_performance.unwrap_or_default();
        let contract = self.latest_transaction_contract_data.unwrap_or_default();
        NormalizedResult {
            id: self.piid.or(self.fain),
            internal_id: self.generated_unique_award_id,
            description: self.description,
            amount: self.total_obligation,
            recipient_name: recipient.recipient_name,
            recipient_id: recipient.recipient_hash,
            awarding_agency: agency.toptier_agency.and_then(|a| a.name),
            awarding_sub_agency: agency.subtier_agency.and_then(|a| a.name),
            award_type: self.type_description,
            naics: contract.naics.map(|code| CodeLabel {
                code,
                description: contract.naics_description,
            }),
            psc: contract.product_or_service_code.map(|code| CodeLabel {
                code,
                description: contract.product_or_service_co_desc,
            }),
            place_of_performance_state: self.place_of_performance.and_then(|p| p.state_code),
            performance_start_date: period.start_date,
            performance_end_date: period.end_date,
            signed_date: self.date_signed,
            parent_award_id: self.parent_award.and_then(|p| p.piid),
            ..Default::default()
        }
    }
}

/// Raw upstream records, tagged by the shape they arrived in.
#[derive(Debug, Clone)]
pub enum RawRecord {
    Award(AwardRecord),
    Transaction(TransactionRecord),
    IdvChild(IdvChildRecord),
    AwardDetail(AwardDetailRecord),
}

impl RawRecord {
    pub fn award(value: Value) -> Self {
        RawRecord::Award(lenient::record(value))
    }

    pub fn transaction(value: Value) -> Self {
        RawRecord::Transaction(lenient::record(value))
    }

    pub fn idv_child(value: Value) -> Self {
        RawRecord::IdvChild(lenient::record(value))
    }

    pub fn award_detail(value: Value) -> Self {
        RawRecord::AwardDetail(lenient::record(value))
    }

    pub fn normalize(self) -> NormalizedResult {
        match self {
            RawRecord::Award(r) => r.normalize(),
            RawRecord::Transaction(r) => r.normalize(),
            RawRecord::IdvChild(r) => r.normalize(),
            RawRecord::AwardDetail(r) => r.normalize(),
        }
    }
}
