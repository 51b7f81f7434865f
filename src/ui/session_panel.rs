/// Collapsible session manager panel: save the current tab set under a
/// name, list saved sessions, restore/rename/delete them.

use patternfly_yew::prelude::*;
use wasm_bindgen::JsValue;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::storage::SessionMapping;
use crate::tab_data::{SavedTab, SessionInfo};

#[derive(Properties, PartialEq)]
pub struct SessionPanelProps {
    pub sessions: SessionMapping,
    #[prop_or(false)]
    pub disabled: bool,
    pub on_save: Callback<String>,
    pub on_restore: Callback<Vec<SavedTab>>,
    pub on_rename: Callback<(String, String)>,
    pub on_delete: Callback<String>,
}

#[function_component(SessionPanel)]
pub fn session_panel(props: &SessionPanelProps) -> Html {
    let expanded = use_state(|| false);
    let name_input = use_state(String::new);
    let editing_session = use_state(|| None::<String>); // session name being renamed
    let edit_input_value = use_state(String::new);

    let toggle_expanded = {
        let expanded = expanded.clone();
        Callback::from(move |_| {
            expanded.set(!*expanded);
        })
    };

    // Save form
    let on_name_input = {
        let name_input = name_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                name_input.set(input.value());
            }
        })
    };

    // Blank names are a silent no-op; the input clears once a save is
    // actually emitted
    let do_save = {
        let name_input = name_input.clone();
        let on_save = props.on_save.clone();
        Callback::from(move |_: ()| {
            let name = name_input.trim().to_string();
            if name.is_empty() {
                return;
            }
            on_save.emit(name);
            name_input.set(String::new());
        })
    };

    let on_save_click = do_save.reform(|_: MouseEvent| ());

    let on_name_keydown = {
        let do_save = do_save.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                do_save.emit(());
            }
        })
    };

    // Inline rename editor
    let on_start_edit = {
        let editing_session = editing_session.clone();
        let edit_input_value = edit_input_value.clone();
        Callback::from(move |name: String| {
            edit_input_value.set(name.clone());
            editing_session.set(Some(name));
        })
    };

    let on_edit_input = {
        let edit_input_value = edit_input_value.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                edit_input_value.set(input.value());
            }
        })
    };

    let on_save_edit = {
        let editing_session = editing_session.clone();
        let edit_input_value = edit_input_value.clone();
        let on_rename = props.on_rename.clone();
        Callback::from(move |_| {
            if let Some(old_name) = (*editing_session).clone() {
                on_rename.emit((old_name, (*edit_input_value).clone()));
            }
            editing_session.set(None);
        })
    };

    let on_cancel_edit = {
        let editing_session = editing_session.clone();
        Callback::from(move |_| {
            editing_session.set(None);
        })
    };

    let total_tabs: usize = props
        .sessions
        .iter()
        .map(|(_, session)| session.tabs().len())
        .sum();

    html! {
        <div class="session-container">
            <button onclick={toggle_expanded} class="session-toggle">
                {"Session Manager"}
                <span class="arrow-icon">{if *expanded { "▲" } else { "▼" }}</span>
            </button>

            if *expanded {
                <div class="session-panel">
                    <div class="session-save">
                        <input
                            type="text"
                            placeholder="Session name..."
                            value={(*name_input).clone()}
                            oninput={on_name_input}
                            onkeydown={on_name_keydown}
                            class="session-name-input"
                        />
                        <Button onclick={on_save_click} disabled={props.disabled}>
                            {"Save"}
                        </Button>
                    </div>

                    if props.sessions.is_empty() {
                        <div class="empty-state">
                            <p>{"No saved sessions yet."}</p>
                            <p class="empty-state-hint">{"Name one above to checkpoint your open tabs."}</p>
                        </div>
                    } else {
                        <div class="session-list">
                            {for props.sessions.iter().map(|(name, session)| {
                                let is_editing = (*editing_session).as_ref() == Some(name);
                                html! {
                                    <SessionItem
                                        key={name.clone()}
                                        name={name.clone()}
                                        info={session.info()}
                                        tabs={session.tabs().to_vec()}
                                        is_editing={is_editing}
                                        edit_value={(*edit_input_value).clone()}
                                        disabled={props.disabled}
                                        on_restore={props.on_restore.clone()}
                                        on_delete={props.on_delete.clone()}
                                        on_start_edit={on_start_edit.clone()}
                                        on_save_edit={on_save_edit.clone()}
                                        on_cancel_edit={on_cancel_edit.clone()}
                                        on_edit_input={on_edit_input.clone()}
                                    />
                                }
                            })}
                        </div>

                        <div class="session-footer">
                            {format!("{} sessions • {} total tabs", props.sessions.len(), total_tabs)}
                        </div>
                    }
                </div>
            }
        </div>
    }
}

// One saved-session card
#[derive(Properties, PartialEq)]
struct SessionItemProps {
    name: String,
    info: SessionInfo,
    tabs: Vec<SavedTab>,
    is_editing: bool,
    edit_value: String,
    disabled: bool,
    on_restore: Callback<Vec<SavedTab>>,
    on_delete: Callback<String>,
    on_start_edit: Callback<String>,
    on_save_edit: Callback<()>,
    on_cancel_edit: Callback<()>,
    on_edit_input: Callback<InputEvent>,
}

#[function_component(SessionItem)]
fn session_item(props: &SessionItemProps) -> Html {
    let info = props.info;

    let mut summary = format!("{} tabs", info.tab_count);
    if !info.is_legacy {
        if info.domains > 0 {
            summary.push_str(&format!(" • {} sites", info.domains));
        }
        if let Some(timestamp) = info.timestamp {
            summary.push_str(&format!(" • {}", format_timestamp(timestamp)));
        }
    }

    html! {
        <div class="session-item-card">
            <div class="session-title-container">
                if props.is_editing {
                    <div class="session-title-edit-mode">
                        <input
                            type="text"
                            value={props.edit_value.clone()}
                            oninput={props.on_edit_input.clone()}
                            class="session-title-input"
                        />
                        <Button onclick={props.on_save_edit.reform(|_| ())}>
                            {"✓"}
                        </Button>
                        <Button
                            onclick={props.on_cancel_edit.reform(|_| ())}
                            variant={ButtonVariant::Secondary}
                        >
                            {"✗"}
                        </Button>
                    </div>
                } else {
                    <h4 class="session-title">{&props.name}</h4>
                }
                <p class="session-summary">{summary}</p>
            </div>

            <div class="session-actions">
                <Button
                    onclick={props.on_restore.reform({
                        let tabs = props.tabs.clone();
                        move |_| tabs.clone()
                    })}
                    disabled={props.disabled}
                    size={ButtonSize::Small}
                >
                    {"Restore"}
                </Button>
                <Button
                    onclick={props.on_start_edit.reform({
                        let name = props.name.clone();
                        move |_| name.clone()
                    })}
                    variant={ButtonVariant::Secondary}
                    size={ButtonSize::Small}
                >
                    {"Rename"}
                </Button>
                <Button
                    onclick={props.on_delete.reform({
                        let name = props.name.clone();
                        move |_| name.clone()
                    })}
                    variant={ButtonVariant::Danger}
                    size={ButtonSize::Small}
                >
                    {"Delete"}
                </Button>
            </div>
        </div>
    }
}

fn format_timestamp(timestamp: f64) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(timestamp));
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date(),
        date.get_hours(),
        date.get_minutes()
    )
}
