use ledger::Expense;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::callbacks::CallbackAction;

pub(crate) fn render_expense_confirmation(expense: &Expense) -> String {
    format!(
        "✅ Gasto registrado com sucesso!\n\n\
         💰 Valor: R${:.2}\n\
         📝 Descrição: {}\n\
         💳 Método: {}",
        expense.amount, expense.category, expense.method
    )
}

pub(crate) fn render_expense_list(expenses: &[Expense]) -> String {
    let mut text = format!("📋 *Seus gastos ({} registros):*\n\n", expenses.len());
    for expense in expenses {
        text.push_str(&format!(
            "🆔 *#{}* | 💰 R$ {:.2} | 📝 {} | 💳 {}\n",
            expense.seq_id, expense.amount, expense.category, expense.method
        ));
    }
    text.push_str(
        "\n💡 Use /consulta <ID> para ver detalhes de um gasto específico.\nExemplo: /consulta 2",
    );
    text
}

/// The single-expense card with prev/next navigation. `total` drives
/// the position indicator and the edge of the next arrow.
pub(crate) fn render_expense_card(
    expense: &Expense,
    total: usize,
) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "📄 *Gasto {seq} de {total}*\n\n\
         🆔 ID: *{seq}*\n\
         💰 Valor: *R$ {amount:.2}*\n\
         📝 Categoria: *{category}*\n\
         💳 Método: *{method}*\n\
         🕐 Data: *{date}*",
        seq = expense.seq_id,
        amount = expense.amount,
        category = expense.category,
        method = expense.method,
        date = expense.created_at.format("%d/%m/%Y %H:%M"),
    );

    (text, nav_keyboard(expense.user_id, expense.seq_id, total))
}

fn nav_keyboard(user_id: u64, seq_id: u32, total: usize) -> InlineKeyboardMarkup {
    let prev = if seq_id > 1 {
        CallbackAction::Nav {
            user_id,
            seq_id: seq_id - 1,
        }
    } else {
        CallbackAction::NavDisabled
    };
    let next = if (seq_id as usize) < total {
        CallbackAction::Nav {
            user_id,
            seq_id: seq_id + 1,
        }
    } else {
        CallbackAction::NavDisabled
    };

    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("⬅️ Anterior", prev.as_data()),
            InlineKeyboardButton::callback(
                format!("📋 {seq_id}/{total}"),
                CallbackAction::NavInfo.as_data(),
            ),
            InlineKeyboardButton::callback("Próximo ➡️", next.as_data()),
        ],
        vec![
            InlineKeyboardButton::callback(
                format!("🗑️ Deletar #{seq_id}"),
                CallbackAction::ConfirmDelete(seq_id).as_data(),
            ),
            InlineKeyboardButton::callback("📋 Ver todos", CallbackAction::NavList.as_data()),
        ],
    ])
}

/// Card-view reply for a sequence number no record carries.
pub(crate) fn render_expense_not_found(seq_id: u32) -> String {
    format!(
        "❌ Nenhum gasto encontrado com o ID *{seq_id}*.\nUse /consulta para ver a lista completa."
    )
}

pub(crate) fn render_delete_prompt(expense: &Expense) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "⚠️ Tem certeza que deseja deletar este gasto?\n\n\
         🆔 ID: {}\n\
         💰 Valor: R$ {:.2}\n\
         📝 Categoria: {}\n\
         💳 Método: {}",
        expense.seq_id, expense.amount, expense.category, expense.method
    );

    let kb = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            "✅ Sim, deletar",
            CallbackAction::ConfirmDelete(expense.seq_id).as_data(),
        ),
        InlineKeyboardButton::callback("❌ Cancelar", CallbackAction::CancelDelete.as_data()),
    ]]);

    (text, kb)
}

pub(crate) fn render_delete_all_prompt(total: usize) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "⚠️ *Atenção!* Você está prestes a deletar *todos os {total} gastos* registrados.\n\n\
         Essa ação é irreversível. Deseja continuar?"
    );

    let kb = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!("🗑️ Sim, deletar todos ({total})"),
            CallbackAction::ConfirmDeleteAll.as_data(),
        )],
        vec![InlineKeyboardButton::callback(
            "❌ Cancelar",
            CallbackAction::CancelDeleteAll.as_data(),
        )],
    ]);

    (text, kb)
}
