use super::intent::ScreenIntent;
use super::mvi::Reducer;
use super::state::{ScreenState, Toast};

pub struct ScreenReducer;

impl Reducer for ScreenReducer {
    type State = ScreenState;
    type Intent = ScreenIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ScreenIntent::NameChanged(name) => ScreenState { name, ..state },
            ScreenIntent::VipChanged(vip) => ScreenState { vip, ..state },
            ScreenIntent::FocusNext => ScreenState {
                focus: state.focus.next(),
                ..state
            },
            ScreenIntent::FocusPrev => ScreenState {
                focus: state.focus.prev(),
                ..state
            },
            ScreenIntent::ResponseLoaded(response) => ScreenState { response, ..state },
            // A newer toast replaces the visible one
            ScreenIntent::ShowToast {
                message,
                expires_at,
            } => ScreenState {
                toast: Some(Toast {
                    message,
                    expires_at,
                }),
                ..state
            },
            ScreenIntent::Tick { now } => {
                let expired = state
                    .toast
                    .as_ref()
                    .is_some_and(|toast| toast.expires_at <= now);
                if expired {
                    ScreenState {
                        toast: None,
                        ..state
                    }
                } else {
                    state
                }
            }
        }
    }
}
