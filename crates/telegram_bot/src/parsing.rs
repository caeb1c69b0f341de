use ledger::UNKNOWN_METHOD;

/// A recognized slash command, with its raw argument tail when one is
/// expected. Unknown commands keep their name for the error reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Start,
    Help,
    Gastei(String),
    Consulta(String),
    Deletar(String),
    DeletarTudo,
    Unknown(String),
}

/// Splits a message into a command and its argument tail.
///
/// Returns `None` for plain text, which the bot ignores. A `@botname`
/// suffix on the command token is stripped so the bot also works in
/// group chats.
pub(crate) fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let token = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").to_string();

    let name = token[1..].split('@').next().unwrap_or("");
    if name.is_empty() {
        return None;
    }

    Some(match name {
        "start" => Command::Start,
        "help" => Command::Help,
        "gastei" => Command::Gastei(args),
        "consulta" => Command::Consulta(args),
        "deletar" => Command::Deletar(args),
        "deletartudo" => Command::DeletarTudo,
        _ => Command::Unknown(name.to_string()),
    })
}

/// Parsed `/gastei` arguments.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ExpenseArgs {
    pub amount: f64,
    pub category: String,
    pub method: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ExpenseArgsError {
    #[error("valor e categoria são obrigatórios")]
    Missing,
    #[error("valor inválido")]
    InvalidAmount,
}

/// Parses `<valor> <categoria> [método]`.
///
/// Rules:
/// - amount and category are required; the method defaults to
///   [`UNKNOWN_METHOD`]
/// - the amount must be a finite, non-negative number
/// - tokens past the method are discarded; there is no quoting syntax
///   for categories containing spaces
pub(crate) fn parse_expense_args(args: &str) -> Result<ExpenseArgs, ExpenseArgsError> {
    let mut tokens = args.split_whitespace();
    let (Some(amount), Some(category)) = (tokens.next(), tokens.next()) else {
        return Err(ExpenseArgsError::Missing);
    };

    let amount: f64 = amount.parse().map_err(|_| ExpenseArgsError::InvalidAmount)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ExpenseArgsError::InvalidAmount);
    }

    Ok(ExpenseArgs {
        amount,
        category: category.to_string(),
        method: tokens.next().unwrap_or(UNKNOWN_METHOD).to_string(),
    })
}

/// Parses a user-facing expense id: a positive integer.
pub(crate) fn parse_seq_id(token: &str) -> Option<u32> {
    token.parse::<u32>().ok().filter(|seq| *seq >= 1)
}
