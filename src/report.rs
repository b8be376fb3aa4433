use crate::coerce::coerce_sum;
use crate::ledger::Ledger;

/// Possible errors to occur while building a report
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ReportError {
    #[error("User ID not found. Please check and try again.")]
    NotFound,
}

/// Whether and how a member's loan is shown
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoanStatus {
    /// No loan was taken
    None,
    /// A loan of the given amount is still open
    Outstanding(f64),
    /// The loan has been paid back
    Completed,
}

/// The figures of one member
#[derive(Clone, Debug, PartialEq)]
pub struct UserView {
    pub user_id: String,
    pub name: String,
    pub designation: String,
    pub credited_2024: f64,
    pub total_fine: f64,
    pub balance_2024: f64,
    pub balance_2025: f64,
    pub total: f64,
    pub loan: LoanStatus,
}

/// Group wide sums over the complete ledger
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aggregate {
    pub balance_2024: f64,
    pub balance_2025: f64,
    pub total_fine: f64,
    pub loan_amount: f64,
    pub profit_amount: f64,
    pub loan_completed: f64,
    /// The money the group currently holds
    ///
    /// Balances, fines, completed loans and profit are added, the sum of all
    /// loan amounts is subtracted.
    pub current_amount: f64,
}

/// Looks up the first row whose `user_id` matches `id`
///
/// Both sides are compared as trimmed text, so `"7"` matches a cell `7` but
/// not `7.0`.
pub fn lookup_user(ledger: &Ledger, id: &str) -> Result<UserView, ReportError> {
    let id = id.trim();
    let row = ledger
        .rows()
        .find(|row| row.user_id().map(str::trim) == Some(id))
        .ok_or(ReportError::NotFound)?;

    let number = |column: &str| row.value(column).unwrap_or(0.0);
    let text = |column: &str| row.label(column).unwrap_or_default().to_owned();

    Ok(UserView {
        user_id: text("user_id"),
        name: text("NAME"),
        designation: text("DESIGNATION"),
        credited_2024: number("2024_Credited"),
        total_fine: number("total_FINE"),
        balance_2024: number("2024_balance"),
        balance_2025: number("2025_balance"),
        total: number("Total"),
        loan: loan_status(row.value("Loan_Amount"), row.value("Loan_Completed")),
    })
}

/// Decides the loan card of a row
///
/// `None` for either argument means the ledger has no such column.
pub fn loan_status(loan_amount: Option<f64>, loan_completed: Option<f64>) -> LoanStatus {
    match (loan_amount, loan_completed) {
        (Some(amount), Some(completed)) if amount > 0.0 && completed > 0.0 => {
            LoanStatus::Completed
        }
        (Some(amount), _) if amount > 0.0 => LoanStatus::Outstanding(amount),
        _ => LoanStatus::None,
    }
}

/// Computes the group sums over every row, independent of any lookup
pub fn compute_aggregates(ledger: &Ledger) -> Aggregate {
    let sum = |column: &str| {
        ledger
            .column(column)
            .map(|values| coerce_sum(values.iter().sum()))
            .unwrap_or(0.0)
    };

    let balance_2024 = sum("2024_balance");
    let balance_2025 = sum("2025_balance");
    let total_fine = sum("total_FINE");
    let loan_amount = sum("Loan_Amount");
    let profit_amount = sum("PROFIT_AMOUNT");
    let loan_completed = sum("Loan_Completed");

    Aggregate {
        balance_2024,
        balance_2025,
        total_fine,
        loan_amount,
        profit_amount,
        loan_completed,
        current_amount: coerce_sum(
            balance_2024 + balance_2025 + total_fine + loan_completed + profit_amount - loan_amount,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(csv: &str) -> Ledger {
        Ledger::from_reader(csv.as_bytes()).unwrap()
    }

    macro_rules! loan_test {
        (
            $name:ident
            $amount:expr,
            $completed:expr
            => $expected:expr
        ) => {
            #[test]
            fn $name() {
                assert_eq!(loan_status($amount, $completed), $expected);
            }
        };
    }

    loan_test!(no_loan_column None, None => LoanStatus::None);
    loan_test!(no_loan_column_but_completed None, Some(5.0) => LoanStatus::None);
    loan_test!(zero_loan Some(0.0), None => LoanStatus::None);
    loan_test!(zero_loan_completed Some(0.0), Some(5.0) => LoanStatus::None);
    loan_test!(negative_loan Some(-10.0), None => LoanStatus::None);
    loan_test!(outstanding_without_column Some(50.0), None => LoanStatus::Outstanding(50.0));
    loan_test!(outstanding_with_zero Some(50.0), Some(0.0) => LoanStatus::Outstanding(50.0));
    loan_test!(outstanding_with_negative Some(50.0), Some(-1.0) => LoanStatus::Outstanding(50.0));
    loan_test!(completed Some(50.0), Some(5.0) => LoanStatus::Completed);

    const GROUP: &str = "user_id,NAME,DESIGNATION,2024_Credited,total_FINE,2024_balance,2025_balance,Total,Loan_Amount,Loan_Completed
1,A,Member,0,10,100,50,160,0,
2,B,Member,0,0,200,0,200,30,0";

    #[test]
    fn end_to_end() {
        let ledger = ledger(GROUP);

        let user = lookup_user(&ledger, "2").unwrap();
        assert_eq!(user.name, "B");
        assert_eq!(user.total, 200.0);
        assert_eq!(user.loan, LoanStatus::Outstanding(30.0));

        let aggregate = compute_aggregates(&ledger);
        assert_eq!(aggregate.balance_2024, 300.0);
        assert_eq!(aggregate.balance_2025, 50.0);
        assert_eq!(aggregate.total_fine, 10.0);
        assert_eq!(aggregate.loan_amount, 30.0);
        assert_eq!(aggregate.loan_completed, 0.0);
        assert_eq!(aggregate.profit_amount, 0.0);
        assert_eq!(aggregate.current_amount, 330.0);
    }

    #[test]
    fn first_match_wins() {
        let ledger = ledger("user_id,NAME,Total\n3,First,1\n3,Second,2\n");
        let user = lookup_user(&ledger, "3").unwrap();
        assert_eq!(user.name, "First");
        assert_eq!(user.total, 1.0);
    }

    #[test]
    fn identifiers_match_as_text() {
        let ledger = ledger("user_id,NAME\n7,Seven\n07,Zero seven\n");
        assert_eq!(lookup_user(&ledger, "7").unwrap().name, "Seven");
        assert_eq!(lookup_user(&ledger, " 07 ").unwrap().name, "Zero seven");
        assert_eq!(lookup_user(&ledger, "7.0"), Err(ReportError::NotFound));
    }

    #[test]
    fn unknown_user() {
        let ledger = ledger(GROUP);
        assert_eq!(lookup_user(&ledger, "99"), Err(ReportError::NotFound));
        assert_eq!(lookup_user(&ledger, ""), Err(ReportError::NotFound));
    }

    #[test]
    fn missing_user_id_column() {
        let ledger = ledger("NAME,Total\nA,1\n");
        assert_eq!(lookup_user(&ledger, "A"), Err(ReportError::NotFound));
    }

    #[test]
    fn missing_fields_read_as_zero() {
        let ledger = ledger("user_id,NAME\n5,Eve\n");
        let user = lookup_user(&ledger, "5").unwrap();
        assert_eq!(user.designation, "");
        assert_eq!(user.credited_2024, 0.0);
        assert_eq!(user.total, 0.0);
        assert_eq!(user.loan, LoanStatus::None);
    }

    #[test]
    fn completed_loan() {
        let ledger = ledger("user_id,Loan_Amount,Loan_Completed\n4,50,5\n");
        assert_eq!(lookup_user(&ledger, "4").unwrap().loan, LoanStatus::Completed);
    }

    #[test]
    fn empty_ledger_sums_to_zero() {
        let empty = ledger(GROUP.lines().next().unwrap());
        assert!(empty.is_empty());
        assert_eq!(compute_aggregates(&empty), Aggregate::default());
    }

    #[test]
    fn optional_columns_missing() {
        let ledger = ledger("user_id,2024_balance,2025_balance,total_FINE\n1,10,20,3\n2,1,2,0\n");
        let aggregate = compute_aggregates(&ledger);
        assert_eq!(aggregate.loan_amount, 0.0);
        assert_eq!(aggregate.loan_completed, 0.0);
        assert_eq!(aggregate.profit_amount, 0.0);
        assert_eq!(aggregate.current_amount, 36.0);
    }

    #[test]
    fn profit_and_completed_loans_are_added() {
        let ledger = ledger(
            "user_id,2024_balance,Loan_Amount,Loan_Completed,PROFIT_AMOUNT\n\
             1,100,40,40,12\n\
             2,100,20,0,3\n",
        );
        let aggregate = compute_aggregates(&ledger);
        assert_eq!(aggregate.loan_amount, 60.0);
        assert_eq!(aggregate.loan_completed, 40.0);
        assert_eq!(aggregate.profit_amount, 15.0);
        assert_eq!(aggregate.current_amount, 200.0 + 40.0 + 15.0 - 60.0);
    }

    #[test]
    fn overflowing_sum_is_zero() {
        let ledger = ledger("user_id,2024_balance,2025_balance\n1,1e308,5\n2,1e308,5\n");
        let aggregate = compute_aggregates(&ledger);
        assert_eq!(aggregate.balance_2024, 0.0);
        assert_eq!(aggregate.current_amount, 10.0);
    }

    #[test]
    fn overflowing_current_amount_is_zero() {
        let ledger = ledger("user_id,2024_balance,2025_balance\n1,1e308,1e308\n");
        let aggregate = compute_aggregates(&ledger);
        assert_eq!(aggregate.balance_2024, 1e308);
        assert_eq!(aggregate.balance_2025, 1e308);
        assert_eq!(aggregate.current_amount, 0.0);
    }

    #[test]
    fn aggregates_ignore_the_looked_up_user() {
        let ledger = ledger(GROUP);
        let before = compute_aggregates(&ledger);
        let _ = lookup_user(&ledger, "1");
        assert_eq!(compute_aggregates(&ledger), before);
    }
}
