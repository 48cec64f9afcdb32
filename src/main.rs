use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use forexpay::application::controller::PaymentFormController;
use forexpay::application::enrollment::EnrollmentService;
use forexpay::application::history::{HistoryService, StatusFilter};
use forexpay::application::progress::ProcessingStep;
use forexpay::application::review::ReviewService;
use forexpay::config::{Config, DEFAULT_API_URL};
use forexpay::domain::currency::CurrencyCode;
use forexpay::domain::enrollment::{ApplicationStatus, CardApplication, Gender, SalarySlip};
use forexpay::domain::session::SessionContext;
use forexpay::domain::transaction::PaymentOutcome;
use forexpay::infrastructure::http::ApiClient;
use forexpay::interfaces::csv::history_writer::HistoryWriter;
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Forex card payments from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the forex card API
    #[arg(long, env = "FOREXPAY_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Id of the signed-in user
    #[arg(long, env = "FOREXPAY_USER_ID", global = true)]
    user_id: Option<String>,

    /// Bearer token for the API
    #[arg(long, env = "FOREXPAY_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the supported payment currencies
    Currencies,
    /// Show the user's forex card
    Card,
    /// Price an amount in INR including the convenience fee
    Quote {
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "USD")]
        currency: CurrencyCode,
    },
    /// Pay a merchant with the forex card
    Pay {
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "USD")]
        currency: CurrencyCode,
        #[arg(long)]
        merchant: String,
        #[arg(long)]
        pin: String,
        /// Minimum time spent in the processing phase, in milliseconds
        #[arg(long, default_value_t = 1500)]
        processing_delay_ms: u64,
    },
    /// Show transaction history
    History {
        /// all, success or failed
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Start of a date range (YYYY-MM-DD); requires --to
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End of a date range (YYYY-MM-DD); requires --from
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Print as CSV
        #[arg(long)]
        csv: bool,
    },
    /// Apply for a forex card
    Apply {
        /// PAN card number, e.g. ABCDE1234F
        #[arg(long)]
        pan: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: NaiveDate,
        #[arg(long)]
        phone: String,
        /// male or female
        #[arg(long)]
        gender: Gender,
        #[arg(long)]
        salary: Decimal,
        #[arg(long)]
        address: String,
        #[arg(long)]
        state: String,
        #[arg(long, default_value = "India")]
        country: String,
        /// Salary proof as a PDF of at most 5MB
        #[arg(long)]
        salary_slip: PathBuf,
    },
    /// Review card applications
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Count applications by status
    Summary,
    /// List applicants with the given status
    List {
        /// pending, approved or rejected
        #[arg(long, default_value = "pending")]
        status: ApplicationStatus,
    },
    /// Approve an application
    Approve { id: u64 },
    /// Reject an application
    Reject { id: u64 },
    /// Save an applicant's salary slip
    SalarySlip {
        id: u64,
        #[arg(long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("forexpay=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::default().with_api_url(cli.api_url.as_str());

    match cli.command {
        Command::Currencies => {
            for code in CurrencyCode::ALL {
                println!("{code}  {:<4} {}", code.symbol(), code.name());
            }
        }
        Command::Card => {
            let session = session(&cli.user_id, &cli.token)?;
            let mut controller = controller(config, session)?;
            let card = controller.load_card().await.into_diagnostic()?;
            println!("Card number: {}", card.masked_number());
            println!(
                "Available balance: {:.2} {}",
                card.balance,
                card.currency_code()
            );
        }
        Command::Quote { amount, currency } => {
            let session = session(&cli.user_id, &cli.token)
                .unwrap_or_else(|_| SessionContext::new("", cli.token.clone()));
            let mut controller = controller(config, session)?;
            controller.update_currency(currency).await;
            controller.update_amount(&amount).await.into_diagnostic()?;
            if let Some(reason) = controller.conversion_error() {
                return Err(miette!("Could not convert {amount} {currency}: {reason}"));
            }
            let conversion = controller.conversion();
            println!("Converted amount: ₹ {:.4}", conversion.converted_amount);
            println!("Convenience fee (2%): ₹ {:.4}", conversion.fee_amount);
            println!("Total amount: ₹ {:.2}", conversion.total_amount);
        }
        Command::Pay {
            amount,
            currency,
            merchant,
            pin,
            processing_delay_ms,
        } => {
            let session = session(&cli.user_id, &cli.token)?;
            let config = config.with_processing_delay(Duration::from_millis(processing_delay_ms));
            let mut controller = controller(config, session)?;

            controller.load_card().await.into_diagnostic()?;
            controller.update_currency(currency).await;
            controller.update_amount(&amount).await.into_diagnostic()?;
            controller.set_merchant(&merchant);
            controller.set_pin(&pin).into_diagnostic()?;

            let mut progress = controller.progress();
            let reporter = tokio::spawn(async move {
                let mut step = ProcessingStep::Starting;
                while progress.changed().await.is_ok() {
                    let next = ProcessingStep::from_progress(*progress.borrow_and_update());
                    if next != step {
                        step = next;
                        tracing::info!("{}", step.label());
                    }
                }
            });

            let result = controller.submit().await;
            drop(controller);
            reporter.abort();

            match result.into_diagnostic()? {
                PaymentOutcome::Success {
                    transaction_ref,
                    timestamp,
                    merchant,
                    total_amount,
                } => {
                    println!("Payment successful!");
                    println!("Your payment of INR {total_amount:.2} to {merchant} has been processed.");
                    if transaction_ref.is_backend_issued() {
                        println!("Transaction ID: {transaction_ref}");
                    } else {
                        println!("Reference (display only): {transaction_ref}");
                    }
                    println!("Date: {}", timestamp.format("%Y-%m-%d %H:%M:%S"));
                }
                PaymentOutcome::Failure { reason } => {
                    return Err(miette!("Payment failed: {reason}"));
                }
            }
        }
        Command::History {
            status,
            from,
            to,
            csv,
        } => {
            let session = session(&cli.user_id, &cli.token)?;
            let client = ApiClient::new(&config, &session).into_diagnostic()?;
            let service = HistoryService::new(session, Arc::new(client));

            let records = if from.is_some() || to.is_some() {
                service.between(from, to).await.into_diagnostic()?
            } else {
                service.recent(status).await.into_diagnostic()?
            };

            if csv {
                let stdout = io::stdout();
                let mut writer = HistoryWriter::new(stdout.lock());
                writer.write_records(&records).into_diagnostic()?;
            } else if records.is_empty() {
                println!("No transactions found.");
            } else {
                for record in &records {
                    println!(
                        "{:<20} {:<24} {:>12.2} {:<8} ₹ {:.2}",
                        record.date,
                        record.merchant,
                        record.amount,
                        record.status.as_str(),
                        record.current_balance
                    );
                }
            }
        }
        Command::Apply {
            pan,
            dob,
            phone,
            gender,
            salary,
            address,
            state,
            country,
            salary_slip,
        } => {
            let session = session(&cli.user_id, &cli.token)?;
            let bytes = std::fs::read(&salary_slip).into_diagnostic()?;
            let file_name = salary_slip
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "salary-slip.pdf".to_string());
            let application = CardApplication {
                pan,
                dob,
                phone_number: phone,
                gender,
                salary,
                address,
                state,
                country,
            };

            let client = ApiClient::new(&config, &session).into_diagnostic()?;
            let service = EnrollmentService::new(session, Arc::new(client));
            service
                .apply(application, SalarySlip::new(file_name, bytes))
                .await
                .into_diagnostic()?;
            println!("Forex card application submitted!");
        }
        Command::Admin { action } => {
            let session = SessionContext::new("", cli.token.clone());
            let client = ApiClient::new(&config, &session).into_diagnostic()?;
            let service = ReviewService::new(Arc::new(client));

            match action {
                AdminAction::Summary => {
                    let counts = service.counts().await;
                    println!("Pending:  {}", counts.pending);
                    println!("Approved: {}", counts.approved);
                    println!("Rejected: {}", counts.rejected);
                    println!("Approval rate: {}%", counts.approval_rate());
                }
                AdminAction::List { status } => {
                    let applicants = service.applicants(status).await.into_diagnostic()?;
                    if applicants.is_empty() {
                        println!("No {status} applications.");
                    }
                    for applicant in &applicants {
                        let salary = applicant
                            .salary
                            .map(|salary| format!("₹{salary}"))
                            .unwrap_or_default();
                        println!(
                            "{:<6} {:<24} {:<32} {:>12} {}",
                            applicant.id, applicant.name, applicant.email, salary, applicant.pan
                        );
                    }
                }
                AdminAction::Approve { id } => {
                    service.approve(id).await.into_diagnostic()?;
                    println!("User approved successfully!");
                }
                AdminAction::Reject { id } => {
                    service.reject(id).await.into_diagnostic()?;
                    println!("User rejected successfully!");
                }
                AdminAction::SalarySlip { id, output } => {
                    let bytes = service.salary_slip(id).await.into_diagnostic()?;
                    std::fs::write(&output, bytes).into_diagnostic()?;
                    println!("Saved salary slip to {}", output.display());
                }
            }
        }
    }

    Ok(())
}

fn session(user_id: &Option<String>, token: &Option<String>) -> Result<SessionContext> {
    let user_id = user_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| miette!("User ID not found. Pass --user-id or set FOREXPAY_USER_ID."))?;
    Ok(SessionContext::new(user_id, token.clone()))
}

fn controller(config: Config, session: SessionContext) -> Result<PaymentFormController> {
    let client = Arc::new(ApiClient::new(&config, &session).into_diagnostic()?);
    Ok(PaymentFormController::new(
        session,
        config,
        client.clone(),
        client.clone(),
        client,
    ))
}
