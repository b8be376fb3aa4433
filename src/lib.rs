pub use self::{
    coerce::{coerce, coerce_sum, parse_number},
    ledger::{Ledger, LedgerError, Row},
    render::{render_cards, Format, Page, PageWriter, ReportRecord, Session},
    report::{
        compute_aggregates, loan_status, lookup_user, Aggregate, LoanStatus, ReportError, UserView,
    },
};

mod coerce;
mod ledger;
mod render;
mod report;
