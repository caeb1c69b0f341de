use chrono::{SubsecRound, Utc};
use ledger::{LedgerError, NewExpense};
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, InlineKeyboardMarkup, MessageId, ParseMode},
};

use crate::{
    ConfigParameters,
    callbacks::CallbackAction,
    parsing::{Command, ExpenseArgsError, parse_command, parse_expense_args, parse_seq_id},
    ui,
};

const QUERY_ERROR_TEXT: &str =
    "❌ Ocorreu um erro ao consultar seus gastos. Tente novamente mais tarde.";

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(command) = parse_command(text) else {
        // Plain chatter; the bot only reacts to commands.
        return Ok(());
    };

    let user_id = from.id.0;
    let chat_id = msg.chat.id;

    match command {
        Command::Start => {
            tracing::info!(user_id, chat_id = chat_id.0, "processing /start");
            bot.send_message(chat_id, welcome_text())
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Command::Help => {
            tracing::info!(user_id, chat_id = chat_id.0, "processing /help");
            bot.send_message(chat_id, help_text())
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Command::Gastei(args) => handle_expense(&bot, &msg, &cfg, user_id, &args).await?,
        Command::Consulta(args) => handle_query(&bot, &cfg, chat_id, user_id, &args).await?,
        Command::Deletar(args) => handle_delete(&bot, &cfg, chat_id, user_id, &args).await?,
        Command::DeletarTudo => handle_delete_all(&bot, &cfg, chat_id, user_id).await?,
        Command::Unknown(name) => {
            tracing::info!(user_id, command = %name, "unrecognized command");
            bot.send_message(chat_id, unknown_command_text(&name)).await?;
        }
    }

    Ok(())
}

async fn handle_expense(
    bot: &Bot,
    msg: &Message,
    cfg: &ConfigParameters,
    user_id: u64,
    args: &str,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    tracing::info!(user_id, chat_id = chat_id.0, "processing /gastei");

    let parsed = match parse_expense_args(args) {
        Ok(parsed) => parsed,
        Err(ExpenseArgsError::Missing) => {
            tracing::error!(
                user_id,
                "invalid /gastei format, expected: /gastei <amount> <category> [method]"
            );
            bot.send_message(
                chat_id,
                "⚠️ Formato incorreto — use: /gastei <valor> <categoria> [método] | Exemplo: /gastei 21.90 uber pix",
            )
            .await?;
            return Ok(());
        }
        Err(ExpenseArgsError::InvalidAmount) => {
            tracing::error!(user_id, "failed to parse amount value: {args:?}");
            bot.send_message(chat_id, "Valor inválido, exemplo: /gastei 21.74 uber pix")
                .await?;
            return Ok(());
        }
    };

    let submission = NewExpense {
        user_id,
        chat_id: chat_id.0,
        username: msg.from.as_ref().and_then(|user| user.username.clone()),
        amount: parsed.amount,
        category: parsed.category,
        method: parsed.method,
        created_at: Utc::now().trunc_subsecs(0),
    };

    match cfg.ledger.append(submission).await {
        Ok(expense) => {
            bot.send_message(chat_id, ui::render_expense_confirmation(&expense))
                .await?;
        }
        Err(err) => {
            tracing::error!(user_id, "failed to save expense: {err}");
            bot.send_message(chat_id, "❌ Erro ao salvar gasto. Tente novamente.")
                .await?;
        }
    }

    Ok(())
}

async fn handle_query(
    bot: &Bot,
    cfg: &ConfigParameters,
    chat_id: ChatId,
    user_id: u64,
    args: &str,
) -> ResponseResult<()> {
    tracing::info!(user_id, chat_id = chat_id.0, "processing /consulta");

    let tokens: Vec<&str> = args.split_whitespace().collect();
    if let [token] = tokens.as_slice() {
        let Some(seq_id) = parse_seq_id(token) else {
            bot.send_message(
                chat_id,
                "❌ ID inválido. Use um número inteiro maior que zero.\nExemplo: /consulta 3",
            )
            .await?;
            return Ok(());
        };
        return show_expense_view(bot, cfg, chat_id, user_id, seq_id, None).await;
    }

    match cfg.ledger.list(user_id).await {
        Ok(expenses) if expenses.is_empty() => {
            bot.send_message(chat_id, "📝 Você ainda não registrou nenhum gasto.")
                .await?;
        }
        Ok(expenses) => {
            bot.send_message(chat_id, ui::render_expense_list(&expenses))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Err(err) => {
            tracing::error!(user_id, "failed to query expenses: {err}");
            bot.send_message(chat_id, QUERY_ERROR_TEXT).await?;
        }
    }

    Ok(())
}

async fn handle_delete(
    bot: &Bot,
    cfg: &ConfigParameters,
    chat_id: ChatId,
    user_id: u64,
    args: &str,
) -> ResponseResult<()> {
    tracing::info!(user_id, chat_id = chat_id.0, "processing /deletar");

    let tokens: Vec<&str> = args.split_whitespace().collect();
    let [token] = tokens.as_slice() else {
        bot.send_message(
            chat_id,
            "❌ Uso incorreto. Use: /deletar <ID do gasto>\nExemplo: /deletar 3\n\nUse /consulta para ver os IDs dos seus gastos.",
        )
        .await?;
        return Ok(());
    };
    let Some(seq_id) = parse_seq_id(token) else {
        bot.send_message(
            chat_id,
            "❌ ID inválido. Use um número inteiro maior que zero.\nExemplo: /deletar 3",
        )
        .await?;
        return Ok(());
    };

    match cfg.ledger.get_by_seq(user_id, seq_id).await {
        Ok(expense) => {
            let (text, kb) = ui::render_delete_prompt(&expense);
            bot.send_message(chat_id, text).reply_markup(kb).await?;
        }
        Err(LedgerError::NotFound(_)) => {
            bot.send_message(
                chat_id,
                format!(
                    "❌ Nenhum gasto encontrado com o ID {seq_id}.\nUse /consulta para ver os IDs disponíveis."
                ),
            )
            .await?;
        }
        Err(err) => {
            tracing::error!(user_id, seq_id, "failed to load expense: {err}");
            bot.send_message(chat_id, QUERY_ERROR_TEXT).await?;
        }
    }

    Ok(())
}

async fn handle_delete_all(
    bot: &Bot,
    cfg: &ConfigParameters,
    chat_id: ChatId,
    user_id: u64,
) -> ResponseResult<()> {
    tracing::info!(user_id, chat_id = chat_id.0, "processing /deletartudo");

    let total = match cfg.ledger.count(user_id).await {
        Ok(total) => total,
        Err(err) => {
            tracing::error!(user_id, "failed to count expenses: {err}");
            bot.send_message(chat_id, QUERY_ERROR_TEXT).await?;
            return Ok(());
        }
    };

    if total == 0 {
        bot.send_message(chat_id, "📝 Você não possui nenhum gasto registrado.")
            .await?;
        return Ok(());
    }

    let (text, kb) = ui::render_delete_all_prompt(total);
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(kb)
        .await?;

    Ok(())
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    // Dismiss the client-side loading state regardless of the payload.
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();
    let user_id = q.from.id.0;

    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        tracing::warn!(user_id, data = ?q.data, "unrecognized callback payload");
        return Ok(());
    };

    match action {
        CallbackAction::NavDisabled | CallbackAction::NavInfo => {}
        CallbackAction::Nav { seq_id, .. } => {
            show_expense_view(&bot, &cfg, chat_id, user_id, seq_id, Some(message_id)).await?;
        }
        CallbackAction::NavList => match cfg.ledger.list(user_id).await {
            Ok(expenses) if expenses.is_empty() => {
                bot.edit_message_text(chat_id, message_id, "📝 Nenhum gasto registrado.")
                    .await?;
            }
            Ok(expenses) => {
                bot.edit_message_text(chat_id, message_id, ui::render_expense_list(&expenses))
                    .parse_mode(ParseMode::Markdown)
                    .await?;
            }
            Err(err) => {
                tracing::error!(user_id, "failed to query expenses: {err}");
                bot.edit_message_text(chat_id, message_id, QUERY_ERROR_TEXT)
                    .await?;
            }
        },
        CallbackAction::CancelDelete | CallbackAction::CancelDeleteAll => {
            // Editing without a keyboard also clears the buttons.
            bot.edit_message_text(chat_id, message_id, "❌ Operação cancelada.")
                .await?;
        }
        CallbackAction::ConfirmDelete(seq_id) => {
            match cfg.ledger.delete_by_seq(user_id, seq_id).await {
                Ok(()) => {
                    tracing::info!(user_id, seq_id, "expense deleted via confirmation");
                    bot.edit_message_text(
                        chat_id,
                        message_id,
                        format!("✅ Gasto #{seq_id} deletado com sucesso!"),
                    )
                    .await?;
                }
                Err(LedgerError::NotFound(_)) => {
                    bot.edit_message_text(
                        chat_id,
                        message_id,
                        format!("❌ Nenhum gasto encontrado com o ID {seq_id}."),
                    )
                    .await?;
                }
                Err(err) => {
                    tracing::error!(user_id, seq_id, "failed to delete expense: {err}");
                    bot.edit_message_text(
                        chat_id,
                        message_id,
                        "❌ Ocorreu um erro ao deletar o gasto. Tente novamente mais tarde.",
                    )
                    .await?;
                }
            }
        }
        CallbackAction::ConfirmDeleteAll => match cfg.ledger.delete_all(user_id).await {
            Ok(total) => {
                tracing::info!(user_id, count = total, "all expenses deleted via confirmation");
                bot.edit_message_text(
                    chat_id,
                    message_id,
                    format!("✅ Todos os {total} gastos foram deletados com sucesso!"),
                )
                .await?;
            }
            Err(err) => {
                tracing::error!(user_id, "failed to delete expenses: {err}");
                bot.edit_message_text(
                    chat_id,
                    message_id,
                    "❌ Ocorreu um erro ao deletar os gastos. Tente novamente mais tarde.",
                )
                .await?;
            }
        },
    }

    Ok(())
}

/// Renders the single-expense card, either as a fresh message or in
/// place of the message the navigation buttons hang off.
async fn show_expense_view(
    bot: &Bot,
    cfg: &ConfigParameters,
    chat_id: ChatId,
    user_id: u64,
    seq_id: u32,
    edit: Option<MessageId>,
) -> ResponseResult<()> {
    let expense = match cfg.ledger.get_by_seq(user_id, seq_id).await {
        Ok(expense) => expense,
        Err(LedgerError::NotFound(_)) => {
            let text = ui::render_expense_not_found(seq_id);
            return send_or_edit(bot, chat_id, edit, text, None).await;
        }
        Err(err) => {
            tracing::error!(user_id, seq_id, "failed to load expense: {err}");
            return send_or_edit(bot, chat_id, edit, QUERY_ERROR_TEXT.to_string(), None).await;
        }
    };

    let total = match cfg.ledger.count(user_id).await {
        Ok(total) => total,
        Err(err) => {
            tracing::error!(user_id, "failed to count expenses: {err}");
            return send_or_edit(bot, chat_id, edit, QUERY_ERROR_TEXT.to_string(), None).await;
        }
    };

    let (text, kb) = ui::render_expense_card(&expense, total);
    send_or_edit(bot, chat_id, edit, text, Some(kb)).await
}

async fn send_or_edit(
    bot: &Bot,
    chat_id: ChatId,
    edit: Option<MessageId>,
    text: String,
    kb: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    match (edit, kb) {
        (Some(message_id), Some(kb)) => {
            bot.edit_message_text(chat_id, message_id, text)
                .parse_mode(ParseMode::Markdown)
                .reply_markup(kb)
                .await?;
        }
        (Some(message_id), None) => {
            bot.edit_message_text(chat_id, message_id, text)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        (None, Some(kb)) => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Markdown)
                .reply_markup(kb)
                .await?;
        }
        (None, None) => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
    }
    Ok(())
}

fn welcome_text() -> &'static str {
    "👋 *Bem-vindo ao Money Savior!*\n\nRegistre seus gastos direto pelo Telegram:\n\n💸 /gastei 21.90 uber pix\n📋 /consulta\n\nDigite /help para ver todos os comandos disponíveis."
}

fn help_text() -> &'static str {
    "🆘 *Ajuda — Comandos Disponíveis*

🚀 *Comandos principais:*

▶️ */start*
Inicia o bot e exibe a mensagem de boas-vindas.

💸 */gastei <valor> <categoria> [método]*
Registra uma nova despesa.
Exemplo: /gastei 45.50 supermercado débito

📋 */consulta*
Exibe todos os seus gastos com IDs em ordem (1, 2, 3...).

📌 */consulta <ID>*
Ver detalhes de um gasto específico com navegação ⬅️ ➡️ entre registros.
Exemplo: /consulta 3

🗑️ */deletar <ID>*
Deleta um gasto específico pelo ID (com confirmação).
Exemplo: /deletar 2

❌ */deletartudo*
Deleta *todos* os gastos registrados (com confirmação).

💡 *Dica:* Os IDs são sequenciais (1, 2, 3...). Use /consulta para ver os IDs antes de deletar.

🔙 Digite */start* para voltar ao menu inicial."
}

fn unknown_command_text(name: &str) -> String {
    format!(
        "✖︎ Comando não reconhecido: {name}\n\nO comando \"{name}\" não existe no Money Savior.\n\nDigite /help para ver todos os comandos disponíveis!"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_reply_shows_usage_and_points_at_help() {
        let text = welcome_text();
        assert!(text.contains("Money Savior"));
        assert!(text.contains("/gastei"));
        assert!(text.contains("/help"));
    }

    #[test]
    fn help_text_documents_every_command() {
        let help = help_text();
        for command in ["/start", "/gastei", "/consulta", "/deletar", "/deletartudo"] {
            assert!(help.contains(command), "help text is missing {command}");
        }
    }

    #[test]
    fn unknown_command_reply_echoes_the_name_and_points_at_help() {
        let text = unknown_command_text("orcamento");
        assert!(text.contains("orcamento"));
        assert!(text.contains("/help"));
    }
}
