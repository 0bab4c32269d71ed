use crate::domain::payment::{Payment, PaymentCategory, SplitStatus};
use crate::domain::split_request::{SplitDirection, SplitRequest, SplitRequestStatus};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

const REQUEST_HEADERS: [&str; 8] = [
    "merchant",
    "direction",
    "total",
    "owed",
    "remaining",
    "status",
    "participants",
    "note",
];

const PAYMENT_HEADERS: [&str; 4] = ["merchant", "amount", "category", "split_status"];

#[derive(Serialize)]
struct SplitRequestRecord<'a> {
    merchant: &'a str,
    direction: SplitDirection,
    total: String,
    owed: String,
    remaining: String,
    status: SplitRequestStatus,
    participants: String,
    note: &'a str,
}

impl<'a> From<&'a SplitRequest> for SplitRequestRecord<'a> {
    fn from(request: &'a SplitRequest) -> Self {
        let participants = request
            .participants
            .iter()
            .map(|p| format!("{}:{:.2}", p.name_snapshot, p.amount_owed.value()))
            .collect::<Vec<_>>()
            .join(";");
        Self {
            merchant: &request.merchant,
            direction: request.direction,
            total: format!("{:.2}", request.total_amount.value()),
            owed: format!("{:.2}", request.owed_total().value()),
            remaining: format!("{:.2}", request.remaining().value()),
            status: request.status,
            participants,
            note: &request.note,
        }
    }
}

#[derive(Serialize)]
struct PaymentRecord<'a> {
    merchant: &'a str,
    amount: String,
    category: PaymentCategory,
    split_status: SplitStatus,
}

/// Writes split requests, or payments, as CSV with a header row even when
/// there is nothing to report.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_split_requests(&mut self, requests: &[SplitRequest]) -> Result<()> {
        self.writer.write_record(REQUEST_HEADERS)?;
        for request in requests {
            self.writer.serialize(SplitRequestRecord::from(request))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_payments(&mut self, payments: &[Payment]) -> Result<()> {
        self.writer.write_record(PAYMENT_HEADERS)?;
        for payment in payments {
            self.writer.serialize(PaymentRecord {
                merchant: &payment.merchant,
                amount: format!("{:.2}", payment.amount.value()),
                category: payment.category,
                split_status: payment.split_status,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::PaymentId;
    use crate::domain::money::{Amount, Money};
    use crate::domain::preset::Preset;
    use crate::domain::split_request::SplitParticipant;
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_split_requests() {
        let alex = Preset::new("Alex", "");
        let request = SplitRequest::new(
            PaymentId::new(),
            "Mojo East",
            Money::new(dec!(61.7)),
            SplitDirection::Outgoing,
            vec![SplitParticipant::from_preset(&alex, Money::new(dec!(20.57)))],
        )
        .with_note("dinner");

        let mut out = Vec::new();
        ReportWriter::new(&mut out)
            .write_split_requests(&[request])
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("merchant,direction,total,owed,remaining,status,participants,note")
        );
        assert_eq!(
            lines.next(),
            Some("Mojo East,outgoing,61.70,20.57,41.13,unresolved,Alex:20.57,dinner")
        );
    }

    #[test]
    fn test_write_payments() {
        let mut payment = Payment::new(
            "CVS Pharmacy",
            Amount::new(dec!(19.04)).unwrap(),
            PaymentCategory::Other,
        );
        payment.apply_split_status(SplitStatus::Ignored);

        let mut out = Vec::new();
        ReportWriter::new(&mut out).write_payments(&[payment]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "merchant,amount,category,split_status\nCVS Pharmacy,19.04,other,ignored\n"
        );
    }

    #[test]
    fn test_empty_report_has_header() {
        let mut out = Vec::new();
        ReportWriter::new(&mut out).write_split_requests(&[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "merchant,direction,total,owed,remaining,status,participants,note\n"
        );
    }
}
