/// Popup UI for the Tidy Tabs extension

use std::rc::Rc;

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::operations::{ViewAction, ViewState};
use crate::registry;
use crate::restore;
use crate::storage::{self, SessionMapping};
use crate::tab_data::{SavedTab, TabInfo};
use crate::ui::session_panel::SessionPanel;

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Loading(String),
    Error(String),
}

impl Reducible for ViewState {
    type Action = ViewAction;

    fn reduce(self: Rc<Self>, action: ViewAction) -> Rc<Self> {
        Rc::new(self.apply(action))
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Idle);
    let view = use_reducer(ViewState::default);
    let sessions = use_state(SessionMapping::new);

    // Initial tab query, storage read, and tab-event subscription. The
    // subscription is dropped on unmount so no callback outlives the popup.
    {
        let view = view.clone();
        let sessions = sessions.clone();
        use_effect_with((), move |_| {
            refresh_tabs(view.dispatcher());
            {
                let sessions = sessions.clone();
                spawn_local(async move {
                    sessions.set(storage::load_sessions().await);
                });
            }
            let subscription = {
                let dispatcher = view.dispatcher();
                registry::subscribe_tab_events(move || refresh_tabs(dispatcher.clone()))
            };
            move || drop(subscription)
        });
    }

    // Search handler
    let on_search_input = {
        let view = view.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                view.dispatch(ViewAction::SearchChanged(input.value()));
            }
        })
    };

    // List/group view toggle
    let on_toggle_group = {
        let view = view.clone();
        Callback::from(move |_| {
            view.dispatch(ViewAction::ToggleGrouping);
        })
    };

    // Clicking a row switches to that tab, but only while no bulk
    // selection is underway
    let on_tab_click = {
        let view = view.clone();
        Callback::from(move |tab_id: i32| {
            if !view.selected.is_empty() {
                return;
            }
            spawn_local(async move {
                if let Err(e) = registry::activate_tab(tab_id).await {
                    log::error!("{}", e);
                }
            });
        })
    };

    // Checkbox toggle for bulk actions
    let on_toggle_select = {
        let view = view.clone();
        Callback::from(move |tab_id: i32| {
            view.dispatch(ViewAction::ToggleSelect(tab_id));
        })
    };

    // Close a single tab, then re-query; on error the list stays as-is
    let on_close_tab = {
        let view = view.clone();
        let state = state.clone();
        Callback::from(move |tab_id: i32| {
            let dispatcher = view.dispatcher();
            let state = state.clone();
            spawn_local(async move {
                match registry::close_tab(tab_id).await {
                    Ok(()) => refresh_tabs(dispatcher),
                    Err(e) => {
                        log::error!("{}", e);
                        state.set(AppState::Error(e));
                    }
                }
            });
        })
    };

    // Close all selected tabs in one request. The selection is only
    // cleared once the host confirms the close.
    let on_close_selected = {
        let view = view.clone();
        let state = state.clone();
        Callback::from(move |_| {
            let tab_ids: Vec<i32> = view.selected.iter().copied().collect();
            if tab_ids.is_empty() {
                return;
            }
            let dispatcher = view.dispatcher();
            let state = state.clone();
            spawn_local(async move {
                match registry::close_tabs(&tab_ids).await {
                    Ok(()) => {
                        dispatcher.dispatch(ViewAction::ClearSelection);
                        refresh_tabs(dispatcher);
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        state.set(AppState::Error(e));
                    }
                }
            });
        })
    };

    // Close a whole domain group
    let on_close_group = {
        let view = view.clone();
        let state = state.clone();
        Callback::from(move |tab_ids: Vec<i32>| {
            let dispatcher = view.dispatcher();
            let state = state.clone();
            spawn_local(async move {
                match registry::close_tabs(&tab_ids).await {
                    Ok(()) => refresh_tabs(dispatcher),
                    Err(e) => {
                        log::error!("{}", e);
                        state.set(AppState::Error(e));
                    }
                }
            });
        })
    };

    // Save the current tab set under a user-chosen name
    let on_save_session = {
        let view = view.clone();
        let sessions = sessions.clone();
        let state = state.clone();
        Callback::from(move |name: String| {
            let saved: Vec<SavedTab> = view.tabs.iter().map(SavedTab::from_tab).collect();
            let mut updated = (*sessions).clone();
            if !updated.save(&name, saved, js_sys::Date::now()) {
                return;
            }
            persist_and_set(updated, sessions.clone(), state.clone());
        })
    };

    let on_rename_session = {
        let sessions = sessions.clone();
        let state = state.clone();
        Callback::from(move |(old_name, new_name): (String, String)| {
            let mut updated = (*sessions).clone();
            if !updated.rename(&old_name, &new_name) {
                return;
            }
            persist_and_set(updated, sessions.clone(), state.clone());
        })
    };

    let on_delete_session = {
        let sessions = sessions.clone();
        let state = state.clone();
        Callback::from(move |name: String| {
            let mut updated = (*sessions).clone();
            if !updated.delete(&name) {
                return;
            }
            persist_and_set(updated, sessions.clone(), state.clone());
        })
    };

    // Re-open every tab of a saved session; partial failures are surfaced,
    // the record itself is untouched
    let on_restore_session = {
        let state = state.clone();
        Callback::from(move |tabs: Vec<SavedTab>| {
            let state = state.clone();
            state.set(AppState::Loading("Restoring tabs...".to_string()));
            spawn_local(async move {
                let report = restore::restore_session(&tabs).await;
                if report.is_complete() {
                    state.set(AppState::Idle);
                } else {
                    state.set(AppState::Error(format!(
                        "Restored {} of {} tabs ({} failed)",
                        report.restored(),
                        report.attempted,
                        report.failures.len()
                    )));
                }
            });
        })
    };

    let filtered = view.filtered();
    let is_busy = matches!(*state, AppState::Loading(_));

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tidy Tabs"}</h1>
            <p class="tab-count">{format!("You have {} tabs open", view.tabs.len())}</p>

            // Status display
            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            <input
                type="text"
                placeholder="Search tabs..."
                value={view.search_query.clone()}
                oninput={on_search_input}
                class="search-input"
            />

            <div class="action-bar">
                <Button onclick={on_toggle_group} variant={ButtonVariant::Secondary}>
                    {if view.group_by_domain { "List View" } else { "Group by Site" }}
                </Button>
                if !view.selected.is_empty() {
                    <Button onclick={on_close_selected} disabled={is_busy} variant={ButtonVariant::Danger}>
                        {format!("Close {} tabs", view.selected.len())}
                    </Button>
                }
            </div>

            <div class="tab-list">
                if view.group_by_domain {
                    {for view.grouped().into_iter().map(|(domain, domain_tabs)| {
                        let tab_ids: Vec<i32> = domain_tabs.iter().map(|t| t.id).collect();
                        html! {
                            <div key={domain.clone()} class="domain-group">
                                <div class="domain-header">
                                    <span class="group-title">
                                        {format!("{} ({})", domain, domain_tabs.len())}
                                    </span>
                                    <Button
                                        onclick={on_close_group.reform(move |_| tab_ids.clone())}
                                        variant={ButtonVariant::Secondary}
                                        size={ButtonSize::Small}
                                    >
                                        {"Close All"}
                                    </Button>
                                </div>
                                {for domain_tabs.iter().map(|tab| html! {
                                    <div key={tab.id} class="grouped">
                                        <TabRow
                                            tab={tab.clone()}
                                            selected={view.selected.contains(&tab.id)}
                                            on_click={on_tab_click.clone()}
                                            on_toggle={on_toggle_select.clone()}
                                            on_close={on_close_tab.clone()}
                                        />
                                    </div>
                                })}
                            </div>
                        }
                    })}
                } else {
                    {for filtered.iter().map(|tab| html! {
                        <TabRow
                            key={tab.id}
                            tab={tab.clone()}
                            selected={view.selected.contains(&tab.id)}
                            on_click={on_tab_click.clone()}
                            on_toggle={on_toggle_select.clone()}
                            on_close={on_close_tab.clone()}
                        />
                    })}
                }
            </div>

            if filtered.is_empty() && !view.search_query.is_empty() {
                <p class="no-results">
                    {format!("No tabs found matching \"{}\"", view.search_query)}
                </p>
            }

            <SessionPanel
                sessions={(*sessions).clone()}
                disabled={is_busy}
                on_save={on_save_session}
                on_restore={on_restore_session}
                on_rename={on_rename_session}
                on_delete={on_delete_session}
            />
        </div>
    }
}

// One row in the tab list
#[derive(Properties, PartialEq)]
struct TabRowProps {
    tab: TabInfo,
    selected: bool,
    on_click: Callback<i32>,
    on_toggle: Callback<i32>,
    on_close: Callback<i32>,
}

#[function_component(TabRow)]
fn tab_row(props: &TabRowProps) -> Html {
    let tab = &props.tab;
    let tab_id = tab.id;

    let onclick = props.on_click.reform(move |_: MouseEvent| tab_id);

    // Checkbox and close clicks must not bubble into row activation
    let on_checkbox = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_toggle.emit(tab_id);
        })
    };
    let on_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_close.emit(tab_id);
        })
    };

    let row_class = if props.selected {
        "tab-item selected"
    } else {
        "tab-item"
    };

    html! {
        <div class={row_class} onclick={onclick}>
            <input
                type="checkbox"
                checked={props.selected}
                onclick={on_checkbox}
                class="tab-checkbox"
            />
            if let Some(icon) = &tab.fav_icon_url {
                <img src={icon.clone()} alt="" class="favicon" />
            }
            <span class="tab-title">
                {if tab.pinned { "📌 " } else { "" }}
                {&tab.title}
            </span>
            <button class="close-button" title="Close tab" onclick={on_close}>
                {"×"}
            </button>
        </div>
    }
}

// Helper functions

// Query the host and replace the list wholesale; on error the previous
// list is retained and the failure only logged
fn refresh_tabs(view: UseReducerDispatcher<ViewState>) {
    spawn_local(async move {
        match registry::query_tabs().await {
            Ok(snapshot) => view.dispatch(ViewAction::TabsLoaded(snapshot)),
            Err(e) => log::error!("Tab refresh failed: {}", e),
        }
    });
}

// Issue the storage write first; the in-memory mirror only moves to the
// updated mapping once the write succeeds
fn persist_and_set(
    updated: SessionMapping,
    sessions: UseStateHandle<SessionMapping>,
    state: UseStateHandle<AppState>,
) {
    spawn_local(async move {
        match storage::persist_sessions(&updated).await {
            Ok(()) => sessions.set(updated),
            Err(e) => {
                log::error!("{}", e);
                state.set(AppState::Error(e));
            }
        }
    });
}
