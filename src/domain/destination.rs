use super::ids::{PaymentId, SplitRequestId};
use serde::{Deserialize, Serialize};

/// Screens the UI layer can route to. The engine names a destination; it
/// never navigates itself.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Destination {
    Home,
    Split { payment_id: PaymentId },
    History,
    SplitRequestDetail { id: SplitRequestId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_serialization() {
        let id = PaymentId::new();
        let json = serde_json::to_value(Destination::Split { payment_id: id }).unwrap();
        assert_eq!(json["screen"], "split");
        assert_eq!(json["payment_id"], id.to_string());
    }
}
