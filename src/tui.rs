//! Terminal user interface.

use std::{
    collections::BTreeSet,
    fmt::Debug,
    sync::mpsc::Receiver,
    thread::JoinHandle,
};

use cursive::{
    view::{Nameable, Scrollable},
    views::{Checkbox, Dialog, LinearLayout, SelectView, TextView},
    CbSink, Cursive, CursiveExt,
};

use crate::{
    error::{InstallerError, InstallerErrorKind},
    locale::Locale,
    prompt::{Choice, UserPrompt},
};

mod dialog;

const VERSION_SELECT_VIEW: &str = "version_select_view";

fn option_checkbox_name(index: usize) -> String {
    format!("option_checkbox_{index}")
}

pub(crate) struct Tui {
    channel: Option<CbSink>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
    app_name: String,
    locale: Locale,
}

impl Tui {
    pub fn new(app_name: &str) -> Self {
        Self {
            channel: None,
            handle: None,
            app_name: app_name.to_string(),
            locale: Locale::with_system(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.channel.is_some()
    }

    pub fn run_background(&mut self) -> Result<(), InstallerError> {
        if self.channel.is_some() {
            return Ok(());
        }

        let (sender, receiver) = std::sync::mpsc::sync_channel(1);

        let join_handle = std::thread::spawn(move || {
            let mut cursive = cursive::Cursive::new();

            let _ = sender.send(cursive.cb_sink().clone());

            cursive.run_crossterm()
        });

        self.handle = Some(join_handle);

        let channel = receiver
            .recv()
            .map_err(|_error| InstallerError::new(InstallerErrorKind::Terminal))?;
        self.channel = Some(channel);

        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), InstallerError> {
        if let Some(channel) = self.channel.take() {
            let _ = channel.send(Box::new(|cursive| cursive.quit()));
        }

        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_error| InstallerError::new(InstallerErrorKind::Terminal))??;
        }

        Ok(())
    }

    fn title(&self) -> String {
        self.locale
            .text_args("installer-title", &[("app_name", self.app_name.as_str())])
    }

    fn show_wait_dialog<T>(
        &self,
        dialog: Dialog,
        dialog_receiver: Receiver<T>,
    ) -> Result<T, InstallerError>
    where
        T: Send + 'static,
    {
        self.in_cursive(move |cursive| {
            cursive.add_layer(dialog);
        })?;

        dialog_receiver
            .recv()
            .map_err(|_error| InstallerErrorKind::Terminal.into())
    }

    pub fn show_error<E>(&self, error: E) -> Result<(), InstallerError>
    where
        E: std::error::Error,
    {
        let label = self.locale.text("error-occurred");
        let details_label = self.locale.text("error-details");
        let error_message = crate::error::format_error(error);

        let layout = LinearLayout::vertical()
            .child(TextView::new(label))
            .child(TextView::new("\n"))
            .child(TextView::new(details_label))
            .child(TextView::new("\n"))
            .child(TextView::new(error_message).scrollable());

        let (mut dialog, dialog_receiver) = dialog::info_dialog(&self.locale, &self.title());
        dialog.set_content(layout);

        self.show_wait_dialog(dialog, dialog_receiver)
    }

    pub fn installation_intro(&self) -> Result<Choice<()>, InstallerError> {
        let text = self
            .locale
            .text_args("installer-intro", &[("app_name", self.app_name.as_str())]);

        let (mut dialog, dialog_receiver) =
            dialog::guided_dialog(&self.locale, &self.title(), |_| ());
        dialog.set_content(TextView::new(text).scrollable());

        self.show_wait_dialog(dialog, dialog_receiver)
    }

    pub fn installation_conclusion(&self, uninstaller: &str) -> Result<(), InstallerError> {
        let args = [("app_name", self.app_name.as_str()), ("uninstaller", uninstaller)];
        let text = self.locale.text_args("installer-conclusion", &args);

        let (mut dialog, dialog_receiver) = dialog::info_dialog(&self.locale, &self.title());
        dialog.set_content(TextView::new(text).scrollable());

        self.show_wait_dialog(dialog, dialog_receiver)
    }

    pub fn show_progress_dialog(&self, text_id: &str) -> Result<(), InstallerError> {
        let dialog = dialog::progress_dialog(&self.title());
        let text = self.locale.text(text_id);

        self.in_cursive(move |cursive| {
            cursive.add_layer(dialog);
            dialog::set_progress_dialog_text(cursive, &text);
        })
    }

    pub fn hide_progress_dialog(&self) -> Result<(), InstallerError> {
        self.in_cursive(|cursive| {
            dialog::dismiss_progress_dialog(cursive);
        })
    }

    pub fn update_progress(&self, current: u64, total: u64) -> Result<(), InstallerError> {
        self.in_cursive(move |cursive| {
            dialog::update_progress_dialog_bar(cursive, current, total);
        })
    }

    fn in_cursive<F, T>(&self, func: F) -> Result<T, InstallerError>
    where
        F: FnOnce(&mut Cursive) -> T + Send + 'static,
        T: Send + 'static,
    {
        let channel = self
            .channel
            .as_ref()
            .ok_or_else(|| InstallerError::new(InstallerErrorKind::Terminal))?;
        let (sender, receiver) = std::sync::mpsc::sync_channel(1);

        let result = channel.send(Box::new(move |cursive| {
            let _ = sender.send(func(cursive));
        }));

        if result.is_err() {
            Err(InstallerErrorKind::Terminal.into())
        } else {
            receiver
                .recv()
                .map_err(|_e| InstallerErrorKind::Terminal.into())
        }
    }
}

impl UserPrompt for Tui {
    fn select_one(&self, title: &str, items: &[String]) -> Result<Choice<usize>, InstallerError> {
        let select_view = SelectView::<usize>::new()
            .with_all(items.iter().cloned().zip(0..))
            .with_name(VERSION_SELECT_VIEW);

        let (mut dialog, dialog_receiver) =
            dialog::guided_dialog(&self.locale, title, |cursive| {
                cursive
                    .find_name::<SelectView<usize>>(VERSION_SELECT_VIEW)
                    .and_then(|view| view.selection())
                    .map(|index| *index)
                    .unwrap_or(0)
            });
        dialog.set_content(select_view.scrollable());

        self.show_wait_dialog(dialog, dialog_receiver)
    }

    fn select_many(
        &self,
        title: &str,
        items: &[String],
        defaults: &[bool],
    ) -> Result<Choice<BTreeSet<usize>>, InstallerError> {
        let mut layout = LinearLayout::vertical();

        for (index, item) in items.iter().enumerate() {
            let checked = defaults.get(index).copied().unwrap_or(false);
            let checkbox = Checkbox::new()
                .with_checked(checked)
                .with_name(option_checkbox_name(index));

            layout.add_child(
                LinearLayout::horizontal()
                    .child(checkbox)
                    .child(TextView::new(format!(" {item}"))),
            );
        }

        let count = items.len();
        let (mut dialog, dialog_receiver) =
            dialog::guided_dialog(&self.locale, title, move |cursive| {
                (0..count)
                    .filter(|index| {
                        cursive
                            .find_name::<Checkbox>(&option_checkbox_name(*index))
                            .is_some_and(|checkbox| checkbox.is_checked())
                    })
                    .collect::<BTreeSet<usize>>()
            });
        dialog.set_content(layout.scrollable());

        self.show_wait_dialog(dialog, dialog_receiver)
    }
}

impl Debug for Tui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tui").field("...", &"...").finish()
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Some(channel) = &mut self.channel {
            let _ = channel.send(Box::new(|cursive| cursive.quit()));
        }
    }
}
