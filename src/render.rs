use std::io;

use crate::report::{Aggregate, LoanStatus, ReportError, UserView};

/// Interaction state that is passed into rendering
///
/// Neither flag changes what is rendered yet.
#[derive(Clone, Copy, Debug, Default)]
pub struct Session {
    pub is_admin: bool,
    pub show_login: bool,
}

/// Everything a single lookup produces
#[derive(Debug)]
pub enum Page {
    /// No identifier was entered
    Blank,
    NotFound,
    Dashboard { user: UserView, group: Aggregate },
}

impl Page {
    /// Builds the page for a lookup result
    ///
    /// The group figures are computed by the caller over the whole ledger.
    pub fn from_lookup(lookup: Result<UserView, ReportError>, group: Aggregate) -> Self {
        match lookup {
            Ok(user) => Page::Dashboard { user, group },
            Err(ReportError::NotFound) => Page::NotFound,
        }
    }
}

/// How pages are printed
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Format {
    /// Text cards, see [`render_cards`]
    Cards,
    /// One [`ReportRecord`] per dashboard
    Csv,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cards" => Ok(Format::Cards),
            "csv" => Ok(Format::Csv),
            other => Err(format!("unknown format `{}`, expected `cards` or `csv`", other)),
        }
    }
}

/// Prints pages one after another
///
/// In CSV format the header row is written once, before the first record.
/// Pages without a dashboard are always rendered as cards.
pub struct PageWriter<W: io::Write> {
    format: Format,
    session: Session,
    writer: csv::Writer<W>,
}

impl<W: io::Write> PageWriter<W> {
    pub fn new(out: W, format: Format, session: Session) -> Self {
        Self {
            format,
            session,
            writer: csv::WriterBuilder::new()
                .has_headers(true)
                .from_writer(out),
        }
    }

    /// Writes one page and flushes it
    pub fn write(&mut self, page: &Page) -> Result<(), csv::Error> {
        match (self.format, page) {
            (Format::Csv, Page::Dashboard { user, group }) => {
                self.writer.serialize(ReportRecord::new(user, group))?;
            }
            _ => {
                self.writer.flush()?;
                render_cards(self.writer.get_mut(), page, &self.session)?;
            }
        }
        self.writer.flush()?;

        Ok(())
    }

    pub fn into_inner(self) -> Result<W, csv::Error> {
        self.writer
            .into_inner()
            .map_err(|err| io::Error::new(err.error().kind(), err.error().to_string()).into())
    }
}

/// Writes the page as text cards
pub fn render_cards<W: io::Write>(out: &mut W, page: &Page, _session: &Session) -> io::Result<()> {
    if let Page::Blank = page {
        return Ok(());
    }

    writeln!(out, "Savings Dashboard")?;
    writeln!(out)?;

    let (user, group) = match page {
        Page::Dashboard { user, group } => (user, group),
        _ => {
            writeln!(out, "{}", ReportError::NotFound)?;
            return Ok(());
        }
    };

    writeln!(out, "== User Dashboard - {} ({}) ==", user.name, user.designation)?;
    card(out, "2024 Credited", &amount(user.credited_2024))?;
    card(out, "Fine Amount", &amount(user.total_fine))?;
    card(out, "2024 Balance", &amount(user.balance_2024))?;
    card(out, "2025 Balance", &amount(user.balance_2025))?;
    card(out, "Total", &amount(user.total))?;
    match user.loan {
        LoanStatus::None => {}
        LoanStatus::Outstanding(loan) => card(out, "Loan", &amount(loan))?,
        LoanStatus::Completed => card(out, "Loan", "Loan is completed")?,
    }
    writeln!(out)?;

    writeln!(out, "== Group Dashboard ==")?;
    card(out, "Loan Amount", &amount(group.loan_amount))?;
    card(out, "Sum of 2024 Balance", &amount(group.balance_2024))?;
    card(out, "Sum of 2025 Balance", &amount(group.balance_2025))?;
    card(out, "Sum of Total Fine", &amount(group.total_fine))?;
    card(out, "Current Amount", &amount(group.current_amount))?;

    Ok(())
}

/// A dashboard flattened into one CSV record
#[derive(Debug, serde::Serialize)]
pub struct ReportRecord<'a> {
    user_id: &'a str,
    name: &'a str,
    designation: &'a str,
    credited_2024: f64,
    total_fine: f64,
    balance_2024: f64,
    balance_2025: f64,
    total: f64,
    /// Empty without a loan, the amount while open, `completed` afterwards
    loan: String,
    group_loan_amount: f64,
    group_balance_2024: f64,
    group_balance_2025: f64,
    group_total_fine: f64,
    group_current_amount: f64,
}

impl<'a> ReportRecord<'a> {
    pub fn new(user: &'a UserView, group: &Aggregate) -> Self {
        Self {
            user_id: &user.user_id,
            name: &user.name,
            designation: &user.designation,
            credited_2024: user.credited_2024,
            total_fine: user.total_fine,
            balance_2024: user.balance_2024,
            balance_2025: user.balance_2025,
            total: user.total,
            loan: match user.loan {
                LoanStatus::None => String::new(),
                LoanStatus::Outstanding(loan) => loan.to_string(),
                LoanStatus::Completed => "completed".to_owned(),
            },
            group_loan_amount: group.loan_amount,
            group_balance_2024: group.balance_2024,
            group_balance_2025: group.balance_2025,
            group_total_fine: group.total_fine,
            group_current_amount: group.current_amount,
        }
    }
}

fn card<W: io::Write>(out: &mut W, title: &str, value: &str) -> io::Result<()> {
    writeln!(out, "  {:<20} {}", title, value)
}

fn amount(value: f64) -> String {
    format!("₹{:.2}", value)
}
