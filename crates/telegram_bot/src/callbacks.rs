/// A parsed inline-keyboard payload.
///
/// Payloads are short opaque strings round-tripped verbatim by the
/// chat client. Parsing them once at the dispatch boundary keeps the
/// confirm and navigation flows out of the string domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CallbackAction {
    /// `confirm_delete:<seq>`
    ConfirmDelete(u32),
    /// `cancel_delete`
    CancelDelete,
    /// `confirm_delete_all`
    ConfirmDeleteAll,
    /// `cancel_delete_all`
    CancelDeleteAll,
    /// `qnav:<user_id>:<seq>`. The embedded user id is informational
    /// only; records are always resolved for the clicking user.
    Nav { user_id: u64, seq_id: u32 },
    /// `qnav_list`, replaces the card with the full list.
    NavList,
    /// `qnav_disabled`, an inert arrow at the edge of the range.
    NavDisabled,
    /// `qnav_info`, the inert position indicator.
    NavInfo,
}

impl CallbackAction {
    pub(crate) fn parse(data: &str) -> Option<Self> {
        match data {
            "cancel_delete" => return Some(Self::CancelDelete),
            "confirm_delete_all" => return Some(Self::ConfirmDeleteAll),
            "cancel_delete_all" => return Some(Self::CancelDeleteAll),
            "qnav_list" => return Some(Self::NavList),
            "qnav_disabled" => return Some(Self::NavDisabled),
            "qnav_info" => return Some(Self::NavInfo),
            _ => {}
        }

        if let Some(seq) = data.strip_prefix("confirm_delete:") {
            return seq.parse().ok().map(Self::ConfirmDelete);
        }
        if let Some(rest) = data.strip_prefix("qnav:") {
            let (user_id, seq_id) = rest.split_once(':')?;
            return Some(Self::Nav {
                user_id: user_id.parse().ok()?,
                seq_id: seq_id.parse().ok()?,
            });
        }
        None
    }

    /// The wire form attached to a keyboard button.
    pub(crate) fn as_data(&self) -> String {
        match self {
            Self::ConfirmDelete(seq_id) => format!("confirm_delete:{seq_id}"),
            Self::CancelDelete => "cancel_delete".to_string(),
            Self::ConfirmDeleteAll => "confirm_delete_all".to_string(),
            Self::CancelDeleteAll => "cancel_delete_all".to_string(),
            Self::Nav { user_id, seq_id } => format!("qnav:{user_id}:{seq_id}"),
            Self::NavList => "qnav_list".to_string(),
            Self::NavDisabled => "qnav_disabled".to_string(),
            Self::NavInfo => "qnav_info".to_string(),
        }
    }
}
