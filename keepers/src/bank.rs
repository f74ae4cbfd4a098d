//! Bank collaborator: denomination display metadata only.

use iq_types::DenomMetadata;

pub trait BankKeeper {
    fn denom_metadata(&self, base: &str) -> Option<DenomMetadata>;

    fn set_denom_metadata(&self, metadata: DenomMetadata);
}
