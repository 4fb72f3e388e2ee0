//! Instruction interpreter for the casebook operator shell.
//!
//! Instructions follow the format:
//!
//! `ACTION argument | argument | ...`
//!
//! where ACTION is one of the commands listed by `HELP`. Arguments are
//! separated by `|`; the last argument keeps any further `|` verbatim, so
//! comment and enquiry texts may contain it. Ids are accepted either bare
//! (`3`) or as displayed (`case-3`).
//!
//! Examples:
//! - `LOGIN admin@example.com`
//! - `REGISTER Jane | jane@x.com | Associate`
//! - `CASE R v. Doe | Criminal Law | North-West | High Court | Bamenda | MP,A`
//! - `UPLOAD case-1 | statement`
//! - `VIEW 1 | statement-1760486400000`
//! - `TRAINING Advocacy | Draft a skeleton argument | public | 2026-11-30`

use std::{ops::RangeInclusive, str::FromStr};

use anyhow::anyhow;
use casebook_core::casebook::{
    PortalApiDefaultStack,
    api::{PortalRequest, PortalResponse},
    config::CasebookConfig,
    infrastructure::naming::{FileId, Role, RoleSet, UserId},
    init_casebook,
    services::{
        cases::{CaseFields, CaseStatus},
        enquiries::EnquiryFields,
        trainings::TrainingVisibility,
    },
};
use chrono::NaiveDate;
use tower::Service;
use tracing::info;

/// Represents a command action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Nil,
    Register,
    Login,
    Logout,
    Approve,
    Pending,
    Case,
    Status,
    Upload,
    View,
    Download,
    Comment,
    Cases,
    Show,
    Stats,
    Training,
    Submit,
    Trainings,
    Submissions,
    Submitted,
    Enquiry,
    Enquiries,
    Read,
    Help,
}

impl Command {
    /// Parse a command from a string
    fn parse(s: &str) -> anyhow::Result<Self> {
        match s.to_uppercase().as_str() {
            "REGISTER" => Ok(Command::Register),
            "LOGIN" => Ok(Command::Login),
            "LOGOUT" => Ok(Command::Logout),
            "APPROVE" => Ok(Command::Approve),
            "PENDING" => Ok(Command::Pending),
            "CASE" => Ok(Command::Case),
            "STATUS" => Ok(Command::Status),
            "UPLOAD" => Ok(Command::Upload),
            "VIEW" => Ok(Command::View),
            "DOWNLOAD" => Ok(Command::Download),
            "COMMENT" => Ok(Command::Comment),
            "CASES" => Ok(Command::Cases),
            "SHOW" => Ok(Command::Show),
            "STATS" => Ok(Command::Stats),
            "TRAINING" => Ok(Command::Training),
            "SUBMIT" => Ok(Command::Submit),
            "TRAININGS" => Ok(Command::Trainings),
            "SUBMISSIONS" => Ok(Command::Submissions),
            "SUBMITTED" => Ok(Command::Submitted),
            "ENQUIRY" => Ok(Command::Enquiry),
            "ENQUIRIES" => Ok(Command::Enquiries),
            "READ" => Ok(Command::Read),
            "HELP" | "H" | "?" => Ok(Command::Help),
            _ => Err(anyhow!("Unknown command: {}", s)),
        }
    }

    /// Accepted number of arguments
    fn arity(&self) -> RangeInclusive<usize> {
        match self {
            Command::Nil
            | Command::Logout
            | Command::Pending
            | Command::Cases
            | Command::Stats
            | Command::Trainings
            | Command::Enquiries
            | Command::Help => 0..=0,
            Command::Login
            | Command::Approve
            | Command::Show
            | Command::Submissions
            | Command::Submitted
            | Command::Read => 1..=1,
            Command::Status
            | Command::Upload
            | Command::View
            | Command::Download
            | Command::Comment
            | Command::Submit => 2..=2,
            Command::Register => 3..=3,
            Command::Training => 3..=4,
            Command::Enquiry => 4..=4,
            // Optional detention flag and assignee
            Command::Case => 6..=8,
        }
    }
}

/// Represents a complete instruction: ACTION ARGUMENTS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub command: Command,
    pub arguments: Vec<String>,
}

impl TryFrom<&str> for Instruction {
    type Error = anyhow::Error;

    /// Parse an instruction string in the format "ACTION arg | arg"
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();

        // Skip empty lines and comments
        if s.is_empty() || s.starts_with('#') {
            return Ok(Instruction { command: Command::Nil, arguments: Vec::new() });
        }

        let (action, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let command = Command::parse(action)?;
        let arity = command.arity();
        let rest = rest.trim();
        let arguments: Vec<String> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.splitn(*arity.end().max(&1), '|').map(|arg| arg.trim().to_string()).collect()
        };
        if !arity.contains(&arguments.len()) {
            return Err(anyhow!(
                "Invalid number of arguments for command: {}, expected {:?}, got {}",
                action,
                arity,
                arguments.len()
            ));
        }

        Ok(Instruction { command, arguments })
    }
}

impl TryFrom<String> for Instruction {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Instruction, anyhow::Error> {
        Instruction::try_from(s.as_str())
    }
}

/// Parses `7` or `case-7` into a numeric id.
fn parse_id<T: From<u64>>(arg: &str) -> anyhow::Result<T> {
    let digits = arg.rsplit('-').next().unwrap_or(arg);
    digits.trim().parse::<u64>().map(T::from).map_err(|_| anyhow!("Invalid id: {arg}"))
}

/// Parses a comma separated role list, e.g. `MP,Associate`.
fn parse_roles(arg: &str) -> anyhow::Result<RoleSet> {
    arg.split(',')
        .filter(|role| !role.trim().is_empty())
        .map(|role| Role::from_str(role).map_err(anyhow::Error::from))
        .collect()
}

fn parse_status(arg: &str) -> anyhow::Result<CaseStatus> {
    match arg.to_lowercase().as_str() {
        "active" => Ok(CaseStatus::Active),
        "pending" => Ok(CaseStatus::Pending),
        _ => Err(anyhow!("Invalid status: {arg}, expected Active or Pending")),
    }
}

fn parse_visibility(arg: &str) -> anyhow::Result<TrainingVisibility> {
    match arg.to_lowercase().as_str() {
        "public" => Ok(TrainingVisibility::Public),
        "private" => Ok(TrainingVisibility::Private),
        _ => Err(anyhow!("Invalid visibility: {arg}, expected public or private")),
    }
}

/// Argument at `index`, as an error instead of a panic when it is missing.
fn arg(args: &[String], index: usize) -> anyhow::Result<&str> {
    args.get(index).map(String::as_str).ok_or_else(|| anyhow!("Missing argument {}", index + 1))
}

fn parse_flag(arg: &str) -> anyhow::Result<bool> {
    match arg.to_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        _ => Err(anyhow!("Invalid flag: {arg}, expected yes or no")),
    }
}

/// Operator session: a casebook and the user currently logged in.
#[derive(Debug)]
pub struct Session {
    portal: PortalApiDefaultStack,
    actor: Option<UserId>,
}

impl Session {
    pub fn new(config: &CasebookConfig) -> Self {
        Self { portal: init_casebook(config), actor: None }
    }

    /// User id passed as the actor of authenticated requests
    pub fn actor(&self) -> Option<UserId> {
        self.actor
    }

    fn logged_in(&self) -> anyhow::Result<UserId> {
        self.actor.ok_or_else(|| anyhow!("Not logged in, use LOGIN <email> first"))
    }

    /// Translate an instruction into a portal request.
    ///
    /// Returns `None` for instructions handled by the session itself.
    pub fn request(&self, instruction: &Instruction) -> anyhow::Result<Option<PortalRequest>> {
        let args = &instruction.arguments;
        let request = match instruction.command {
            Command::Nil | Command::Help | Command::Logout => return Ok(None),
            Command::Register => PortalRequest::Register {
                name: arg(args, 0)?.to_string(),
                email: arg(args, 1)?.to_string(),
                role: Role::from_str(arg(args, 2)?)?,
            },
            Command::Login => PortalRequest::Authenticate { email: arg(args, 0)?.to_string() },
            Command::Approve => {
                PortalRequest::Approve { actor: self.logged_in()?, user: parse_id(arg(args, 0)?)? }
            }
            Command::Pending => PortalRequest::ListPendingUsers { actor: self.logged_in()? },
            Command::Case => PortalRequest::CreateCase {
                actor: self.logged_in()?,
                fields: CaseFields {
                    title: arg(args, 0)?.to_string(),
                    case_type: arg(args, 1)?.to_string(),
                    region: arg(args, 2)?.to_string(),
                    court: arg(args, 3)?.to_string(),
                    town: arg(args, 4)?.to_string(),
                    detention: args.get(6).map(|flag| parse_flag(flag)).transpose()?.unwrap_or(false),
                    assigned_to: args.get(7).filter(|name| !name.is_empty()).cloned(),
                },
                visibility: parse_roles(arg(args, 5)?)?,
            },
            Command::Status => PortalRequest::SetStatus {
                actor: self.logged_in()?,
                case: parse_id(arg(args, 0)?)?,
                status: parse_status(arg(args, 1)?)?,
            },
            Command::Upload => PortalRequest::UploadFile {
                actor: self.logged_in()?,
                case: parse_id(arg(args, 0)?)?,
                stem: arg(args, 1)?.to_string(),
            },
            Command::View => PortalRequest::RecordView {
                actor: self.logged_in()?,
                case: parse_id(arg(args, 0)?)?,
                file: FileId::from(arg(args, 1)?),
            },
            Command::Download => PortalRequest::RecordDownload {
                actor: self.logged_in()?,
                case: parse_id(arg(args, 0)?)?,
                file: FileId::from(arg(args, 1)?),
            },
            Command::Comment => PortalRequest::AddComment {
                actor: self.logged_in()?,
                case: parse_id(arg(args, 0)?)?,
                text: arg(args, 1)?.to_string(),
            },
            Command::Cases => PortalRequest::ListCases { actor: self.logged_in()? },
            Command::Show => {
                PortalRequest::GetCase { actor: self.logged_in()?, case: parse_id(arg(args, 0)?)? }
            }
            Command::Stats => PortalRequest::CaseStats { actor: self.logged_in()? },
            Command::Training => PortalRequest::CreateTraining {
                actor: self.logged_in()?,
                title: arg(args, 0)?.to_string(),
                description: arg(args, 1)?.to_string(),
                visibility: parse_visibility(arg(args, 2)?)?,
                deadline: args
                    .get(3)
                    .map(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
                    .transpose()?,
            },
            Command::Submit => PortalRequest::SubmitTraining {
                actor: self.logged_in()?,
                training: parse_id(arg(args, 0)?)?,
                file_name: arg(args, 1)?.to_string(),
            },
            Command::Trainings => PortalRequest::ListTrainings { actor: self.logged_in()? },
            Command::Submissions => PortalRequest::ListSubmissions {
                actor: self.logged_in()?,
                training: parse_id(arg(args, 0)?)?,
            },
            Command::Submitted => PortalRequest::HasSubmitted {
                actor: self.logged_in()?,
                training: parse_id(arg(args, 0)?)?,
            },
            Command::Enquiry => PortalRequest::SubmitEnquiry(EnquiryFields {
                name: arg(args, 0)?.to_string(),
                phone: arg(args, 1)?.to_string(),
                email: arg(args, 2)?.to_string(),
                message: arg(args, 3)?.to_string(),
            }),
            Command::Enquiries => PortalRequest::ListEnquiries { actor: self.logged_in()? },
            Command::Read => PortalRequest::MarkEnquiryRead {
                actor: self.logged_in()?,
                enquiry: parse_id(arg(args, 0)?)?,
            },
        };
        Ok(Some(request))
    }

    /// Execute an instruction against the casebook
    pub async fn execute(
        &mut self,
        instruction: &Instruction,
    ) -> anyhow::Result<Option<PortalResponse>> {
        match instruction.command {
            Command::Help => {
                print_help();
                return Ok(None);
            }
            Command::Logout => {
                if let Some(actor) = self.actor.take() {
                    info!("Logged out {}", actor);
                }
                return Ok(None);
            }
            // A failed login must not leave the previous user acting
            Command::Login => self.actor = None,
            _ => {}
        }
        let Some(request) = self.request(instruction)? else {
            return Ok(None);
        };
        let response = self.portal.call(request).await?;
        if let (Command::Login, PortalResponse::User(user)) = (instruction.command, &response) {
            info!("Logged in as {} ({}, {})", user.name, user.role, user.id);
            self.actor = Some(user.id);
        }
        Ok(Some(response))
    }
}

pub fn print_help() {
    println!("Available instructions:");
    println!("Accounts:");
    println!(" $ REGISTER <name> | <email> | <role>     # Register a pending account");
    println!(" $ LOGIN <email>                          # Act as an approved account");
    println!(" $ LOGOUT                                 # Stop acting as anyone");
    println!(" $ APPROVE <user>                         # Approve a pending account");
    println!(" $ PENDING                                # List accounts awaiting approval");
    println!();
    println!("Cases:");
    println!(" $ CASE <title> | <type> | <region> | <court> | <town> | <roles> [| <detention> [| <assignee>]]");
    println!(" $ STATUS <case> | <Active|Pending>       # Change the status of a case");
    println!(" $ UPLOAD <case> | <name>                 # Attach a file record");
    println!(" $ VIEW <case> | <file>                   # Record a view");
    println!(" $ DOWNLOAD <case> | <file>               # Record a download");
    println!(" $ COMMENT <case> | <text>                # Comment on a case");
    println!(" $ CASES                                  # List visible cases");
    println!(" $ SHOW <case>                            # Show one case");
    println!(" $ STATS                                  # Count visible cases by status");
    println!();
    println!("Trainings:");
    println!(" $ TRAINING <title> | <description> | <public|private> [| <YYYY-MM-DD>]");
    println!(" $ SUBMIT <training> | <file name>        # Submit a .pdf or .docx");
    println!(" $ TRAININGS                              # List visible trainings");
    println!(" $ SUBMISSIONS <training>                 # List submissions");
    println!(" $ SUBMITTED <training>                   # Has your role submitted yet");
    println!();
    println!("Enquiries:");
    println!(" $ ENQUIRY <name> | <phone> | <email> | <message>");
    println!(" $ ENQUIRIES                              # List enquiries");
    println!(" $ READ <enquiry>                         # Mark an enquiry as read");
    println!();
    println!("Utility:");
    println!(" $ HELP                                   # Show this help message");
    println!(" $ # [comment]                            # Comment line");
    println!();
    println!("Roles: Managing Partner (MP), Associate Partner (AP), Associate (A)");
    println!();
}
