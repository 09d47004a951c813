//! Country name input with submit button and feedback line.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdMapPin;

/// Props for the [`GuessForm`] component.
#[derive(Props, Clone, PartialEq)]
pub struct GuessFormProps {
    /// Current text in the input.
    input: String,
    /// A submission is in flight; input and button are disabled.
    busy: bool,
    /// Feedback from the last submission. Hidden when empty.
    message: String,
    /// Called with the new text on every keystroke.
    on_input: EventHandler<String>,
    /// Called when the form is submitted.
    on_submit: EventHandler<()>,
}

/// Text input, submit button and status line.
///
/// The button shows a map pin, or `Loading...` while busy.
#[component]
pub fn GuessForm(props: GuessFormProps) -> Element {
    rsx! {
        form {
            class: "guess-form",
            "data-testid": "country-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                props.on_submit.call(());
            },

            input {
                r#type: "text",
                class: "guess-input",
                "data-testid": "country-input",
                placeholder: "Enter a country name",
                autocomplete: "off",
                value: "{props.input}",
                disabled: props.busy,
                oninput: move |evt: FormEvent| props.on_input.call(evt.value()),
            }

            button {
                r#type: "submit",
                class: "guess-submit",
                "data-testid": "submit-button",
                aria_label: "Submit",
                disabled: props.busy,
                if props.busy {
                    "Loading..."
                } else {
                    Icon { icon: LdMapPin, width: 24, height: 24 }
                }
            }
        }

        if !props.message.is_empty() {
            p { class: "feedback", "data-testid": "feedback-message", "{props.message}" }
        }
    }
}
