//! The virtual-key catalog.
//!
//! Every command the interactive interface understands is a member of the
//! closed [`Action`] enum. The catalog is THE SINGLE SOURCE OF TRUTH for the
//! persisted label, the built-in default bindings and the short status-bar
//! label of each action. Both the bindings file and the status-bar hint
//! rendering derive from it; none of it is mutated at runtime.

/// An abstract command ("virtual key") independent of any physical key.
///
/// Declaration order is the catalog order: it drives the line order of the
/// persisted bindings file and the traversal order of
/// [`fill_missing`](crate::persist::fill_missing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Cancel,
    Select,
    Credits,
    Help,
    Quit,
    Save,
    Reload,
    Copy,
    Paste,
    ChangeView,
    PrevView,
    Import,
    Export,
    Goto,
    OtherCmd,
    ConfigMenu,
    Redraw,
    AddAppt,
    AddTodo,
    PrevDay,
    NextDay,
    PrevWeek,
    NextWeek,
    PrevMonth,
    NextMonth,
    PrevYear,
    NextYear,
    ScrollDown,
    ScrollUp,
    GotoToday,
    Command,
    MoveRight,
    MoveLeft,
    MoveDown,
    MoveUp,
    StartOfWeek,
    EndOfWeek,
    AddItem,
    DelItem,
    EditItem,
    ViewItem,
    PipeItem,
    FlagItem,
    Repeat,
    EditNote,
    ViewNote,
    RaisePriority,
    LowerPriority,
}

struct Entry {
    /// Stable name used as the key in the bindings file.
    label: &'static str,
    /// Space-separated default key-name tokens.
    binding: &'static str,
    /// Short display label for the status-bar menu (localized at render time
    /// by the embedding program; plain English here).
    bar_label: &'static str,
}

const CATALOG: [Entry; Action::COUNT] = [
    Entry { label: "generic-cancel", binding: "ESC", bar_label: "Cancel" },
    Entry { label: "generic-select", binding: "SPC", bar_label: "Select" },
    Entry { label: "generic-credits", binding: "@", bar_label: "Credits" },
    Entry { label: "generic-help", binding: "?", bar_label: "Help" },
    Entry { label: "generic-quit", binding: "q Q", bar_label: "Quit" },
    Entry { label: "generic-save", binding: "s S ^S", bar_label: "Save" },
    Entry { label: "generic-reload", binding: "R", bar_label: "Reload" },
    Entry { label: "generic-copy", binding: "c", bar_label: "Copy" },
    Entry { label: "generic-paste", binding: "p ^V", bar_label: "Paste" },
    Entry { label: "generic-change-view", binding: "TAB", bar_label: "Chg Win" },
    Entry { label: "generic-prev-view", binding: "KEY_BTAB", bar_label: "Prev Win" },
    Entry { label: "generic-import", binding: "i I", bar_label: "Import" },
    Entry { label: "generic-export", binding: "x X", bar_label: "Export" },
    Entry { label: "generic-goto", binding: "g G", bar_label: "Go to" },
    Entry { label: "generic-other-cmd", binding: "o O", bar_label: "OtherCmd" },
    Entry { label: "generic-config-menu", binding: "C", bar_label: "Config" },
    Entry { label: "generic-redraw", binding: "^R", bar_label: "Redraw" },
    Entry { label: "generic-add-appt", binding: "^A", bar_label: "Add Appt" },
    Entry { label: "generic-add-todo", binding: "^T", bar_label: "Add Todo" },
    Entry { label: "generic-prev-day", binding: "T ^H", bar_label: "-1 Day" },
    Entry { label: "generic-next-day", binding: "t ^L", bar_label: "+1 Day" },
    Entry { label: "generic-prev-week", binding: "W ^K", bar_label: "-1 Week" },
    Entry { label: "generic-next-week", binding: "w", bar_label: "+1 Week" },
    Entry { label: "generic-prev-month", binding: "M", bar_label: "-1 Month" },
    Entry { label: "generic-next-month", binding: "m", bar_label: "+1 Month" },
    Entry { label: "generic-prev-year", binding: "Y", bar_label: "-1 Year" },
    Entry { label: "generic-next-year", binding: "y", bar_label: "+1 Year" },
    Entry { label: "generic-scroll-down", binding: "^N", bar_label: "Nxt View" },
    Entry { label: "generic-scroll-up", binding: "^P", bar_label: "Prv View" },
    Entry { label: "generic-goto-today", binding: "^G", bar_label: "Today" },
    Entry { label: "generic-command", binding: ":", bar_label: "Command" },
    Entry { label: "move-right", binding: "l L RGT", bar_label: "Right" },
    Entry { label: "move-left", binding: "h H LFT", bar_label: "Left" },
    Entry { label: "move-down", binding: "j J DWN", bar_label: "Down" },
    Entry { label: "move-up", binding: "k K UP", bar_label: "Up" },
    Entry { label: "start-of-week", binding: "0", bar_label: "beg Week" },
    Entry { label: "end-of-week", binding: "$", bar_label: "end Week" },
    Entry { label: "add-item", binding: "a A", bar_label: "Add Item" },
    Entry { label: "del-item", binding: "d D", bar_label: "Del Item" },
    Entry { label: "edit-item", binding: "e E", bar_label: "Edit Itm" },
    Entry { label: "view-item", binding: "v V RET", bar_label: "View" },
    Entry { label: "pipe-item", binding: "|", bar_label: "Pipe" },
    Entry { label: "flag-item", binding: "!", bar_label: "Flag Itm" },
    Entry { label: "repeat", binding: "r", bar_label: "Repeat" },
    Entry { label: "edit-note", binding: "n N", bar_label: "EditNote" },
    Entry { label: "view-note", binding: ">", bar_label: "ViewNote" },
    Entry { label: "raise-priority", binding: "+", bar_label: "Prio.+" },
    Entry { label: "lower-priority", binding: "-", bar_label: "Prio.-" },
];

impl Action {
    /// Number of catalog entries.
    pub const COUNT: usize = 48;

    /// Every action in catalog order.
    pub const ALL: [Action; Action::COUNT] = [
        Action::Cancel,
        Action::Select,
        Action::Credits,
        Action::Help,
        Action::Quit,
        Action::Save,
        Action::Reload,
        Action::Copy,
        Action::Paste,
        Action::ChangeView,
        Action::PrevView,
        Action::Import,
        Action::Export,
        Action::Goto,
        Action::OtherCmd,
        Action::ConfigMenu,
        Action::Redraw,
        Action::AddAppt,
        Action::AddTodo,
        Action::PrevDay,
        Action::NextDay,
        Action::PrevWeek,
        Action::NextWeek,
        Action::PrevMonth,
        Action::NextMonth,
        Action::PrevYear,
        Action::NextYear,
        Action::ScrollDown,
        Action::ScrollUp,
        Action::GotoToday,
        Action::Command,
        Action::MoveRight,
        Action::MoveLeft,
        Action::MoveDown,
        Action::MoveUp,
        Action::StartOfWeek,
        Action::EndOfWeek,
        Action::AddItem,
        Action::DelItem,
        Action::EditItem,
        Action::ViewItem,
        Action::PipeItem,
        Action::FlagItem,
        Action::Repeat,
        Action::EditNote,
        Action::ViewNote,
        Action::RaisePriority,
        Action::LowerPriority,
    ];

    /// Catalog position of this action.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Action> {
        Action::ALL.get(index).copied()
    }

    /// Resolve a persisted label back to its action. Labels unknown to this
    /// catalog (e.g. written by a newer release) yield `None`.
    pub fn from_label(label: &str) -> Option<Action> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.label() == label)
    }

    /// Stable textual label, used as the key in the bindings file.
    pub fn label(self) -> &'static str {
        CATALOG[self as usize].label
    }

    /// Built-in default binding: space-separated key-name tokens.
    pub fn default_binding(self) -> &'static str {
        CATALOG[self as usize].binding
    }

    /// Short label shown next to the bound key in the status bar.
    pub fn bar_label(self) -> &'static str {
        CATALOG[self as usize].bar_label
    }

    /// One-line description shown by the info popup.
    pub fn description(self) -> &'static str {
        match self {
            Action::Cancel => "Cancel the ongoing action.",
            Action::Select => "Select the highlighted item.",
            Action::Credits => "Print general information about the authors, license, etc.",
            Action::Help => "Display hints whenever some help screens are available.",
            Action::Quit => "Exit from the current menu, or quit the program.",
            Action::Save => "Save the calendar and todo data.",
            Action::Reload => "Reload appointments and todo items.",
            Action::Copy => "Copy the item that is currently selected.",
            Action::Paste => "Paste an item at the current position.",
            Action::ChangeView => "Select the next panel in the main screen.",
            Action::PrevView => "Select the previous panel in the main screen.",
            Action::Import => "Import data from an external file.",
            Action::Export => "Export data to a new file format.",
            Action::Goto => "Select the day to go to.",
            Action::OtherCmd => "Show next possible actions inside the status bar.",
            Action::ConfigMenu => "Enter the configuration menu.",
            Action::Redraw => "Redraw the screen.",
            Action::AddAppt => {
                "Add an appointment, whichever panel is currently selected."
            }
            Action::AddTodo => "Add a todo item, whichever panel is currently selected.",
            Action::PrevDay => {
                "Move to the previous day in the calendar, whichever panel is currently selected."
            }
            Action::NextDay => {
                "Move to the next day in the calendar, whichever panel is currently selected."
            }
            Action::PrevWeek => {
                "Move to the previous week in the calendar, whichever panel is currently selected."
            }
            Action::NextWeek => {
                "Move to the next week in the calendar, whichever panel is currently selected."
            }
            Action::PrevMonth => {
                "Move to the previous month in the calendar, whichever panel is currently selected."
            }
            Action::NextMonth => {
                "Move to the next month in the calendar, whichever panel is currently selected."
            }
            Action::PrevYear => {
                "Move to the previous year in the calendar, whichever panel is currently selected."
            }
            Action::NextYear => {
                "Move to the next year in the calendar, whichever panel is currently selected."
            }
            Action::ScrollDown => {
                "Scroll window down (e.g. when displaying text inside a popup window)."
            }
            Action::ScrollUp => {
                "Scroll window up (e.g. when displaying text inside a popup window)."
            }
            Action::GotoToday => "Go to today, whichever panel is selected.",
            Action::Command => "Enter command mode.",
            Action::MoveRight => "Move to the right.",
            Action::MoveLeft => "Move to the left.",
            Action::MoveDown => "Move down.",
            Action::MoveUp => "Move up.",
            Action::StartOfWeek => {
                "Select the first day of the current week when inside the calendar panel."
            }
            Action::EndOfWeek => {
                "Select the last day of the current week when inside the calendar panel."
            }
            Action::AddItem => "Add an item to the currently selected panel.",
            Action::DelItem => "Delete the currently selected item.",
            Action::EditItem => "Edit the currently selected item.",
            Action::ViewItem => {
                "Display the currently selected item inside a popup window."
            }
            Action::PipeItem => "Pipe the currently selected item to an external program.",
            Action::FlagItem => "Flag the currently selected item as important.",
            Action::Repeat => "Repeat an item.",
            Action::EditNote => {
                "Attach (or edit if one exists) a note to the currently selected item."
            }
            Action::ViewNote => "View the note attached to the currently selected item.",
            Action::RaisePriority => "Raise a task priority inside the todo panel.",
            Action::LowerPriority => "Lower a task priority inside the todo panel.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn all_is_in_declaration_order() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(Action::COUNT), None);
    }

    #[test]
    fn labels_are_unique_and_resolvable() {
        for action in Action::ALL {
            assert_eq!(Action::from_label(action.label()), Some(action));
        }
        assert_eq!(Action::from_label("no-such-action"), None);
    }

    #[test]
    fn every_action_has_default_binding_tokens() {
        for action in Action::ALL {
            assert!(
                !action.default_binding().trim().is_empty(),
                "{} has an empty default binding",
                action.label()
            );
        }
    }

    #[test]
    fn bar_labels_fit_the_status_column() {
        for action in Action::ALL {
            assert!(
                action.bar_label().len() <= 8,
                "{} bar label too wide",
                action.label()
            );
        }
    }
}
