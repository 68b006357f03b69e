//! Terminal driver — one wizard command per stdin line.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::contract::Scenario;
use crate::error::{CommandError, Result};
use crate::views::{KeyActivation, PresentationMode, ProfileForm, render_page};
use crate::wizard::{ContinueOutcome, WizardController};

pub const HELP: &str = "\
Komutlar:
  scenario <A|B>            senaryo değiştir
  set <alan> <değer>        profil alanını güncelle (adım 1)
  evaluate                  profili gönder, sonuçlara geç
  select <option_id>        öneri seç
  continue                  teşviklere devam et / seçenekle tamamla
  back                      bir adım geri
  package <package_id>      paket seç / seçimi kaldır
  key <enter|space> <id>    paket kartında klavye ile etkinleştir
  offer                     teklif özetini aç
  confirm | close           özeti kapat
  retry                     başarısız yüklemeyi tekrar dene
  show                      sayfayı yeniden çiz
  help                      bu metin
  quit                      çıkış";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scenario(Scenario),
    Set { field: String, value: String },
    Evaluate,
    Select(String),
    Continue,
    Back,
    Package(String),
    Key { key: String, package_id: String },
    Offer,
    Confirm,
    Close,
    Retry,
    Show,
    Help,
    Quit,
}

/// What the driver loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Redraw the page.
    Continue,
    /// Print the command list.
    Help,
    /// Blank line; nothing to do.
    Idle,
    Quit,
}

/// Parse one line. Returns `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let name = name.to_lowercase();

    let command = match name.as_str() {
        "scenario" => {
            let arg = required(&name, rest, "A or B")?;
            let scenario = arg.parse::<Scenario>().map_err(|message| CommandError::InvalidArgument {
                command: name.clone(),
                message,
            })?;
            Command::Scenario(scenario)
        }
        "set" => {
            let (field, value) =
                rest.split_once(char::is_whitespace)
                    .ok_or_else(|| CommandError::MissingArgument {
                        command: name.clone(),
                        argument: "a field and a value".into(),
                    })?;
            Command::Set {
                field: field.to_string(),
                value: value.trim().to_string(),
            }
        }
        "evaluate" => Command::Evaluate,
        "select" => Command::Select(required(&name, rest, "an option id")?.to_string()),
        "continue" => Command::Continue,
        "back" => Command::Back,
        "package" => Command::Package(required(&name, rest, "a package id")?.to_string()),
        "key" => {
            let (key, package_id) =
                rest.split_once(char::is_whitespace)
                    .ok_or_else(|| CommandError::MissingArgument {
                        command: name.clone(),
                        argument: "a key and a package id".into(),
                    })?;
            Command::Key {
                key: key.to_string(),
                package_id: package_id.trim().to_string(),
            }
        }
        "offer" => Command::Offer,
        "confirm" => Command::Confirm,
        "close" => Command::Close,
        "retry" => Command::Retry,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "/quit" => Command::Quit,
        _ => return Err(CommandError::Unknown(name)),
    };
    Ok(Some(command))
}

fn required<'a>(command: &str, rest: &'a str, what: &str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            argument: what.to_string(),
        });
    }
    Ok(rest)
}

/// Drives a [`WizardController`] from text commands and owns the step 1 form.
pub struct Repl {
    controller: WizardController,
    form: ProfileForm,
    mode: PresentationMode,
}

impl Repl {
    pub fn new(controller: WizardController, mode: PresentationMode) -> Self {
        Self {
            controller,
            form: ProfileForm::default(),
            mode,
        }
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    /// Reset the step 1 form to the profile echoed by the loaded assessment.
    /// Leaves the form alone while nothing is loaded.
    pub async fn prefill_form(&mut self) {
        let state = self.controller.snapshot().await;
        if let Some(assessment) = state.assessment.data() {
            self.form = ProfileForm::from_echo(&assessment.inputs_echo);
        }
    }

    /// Render the current page.
    pub async fn render(&self) -> String {
        let state = self.controller.snapshot().await;
        render_page(&state, &self.form, self.mode)
    }

    /// Apply one command. Loads started by the command are awaited so the
    /// next render sees their outcome.
    pub async fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Scenario(scenario) => {
                settle(self.controller.set_scenario(scenario).await).await;
                self.prefill_form().await;
            }
            Command::Set { field, value } => self.form.set(&field, &value)?,
            Command::Evaluate => {
                self.form.submit()?;
                self.controller.evaluate().await?;
            }
            Command::Select(option_id) => self.controller.select_option(&option_id).await?,
            Command::Continue => {
                let (outcome, handle) = self.controller.continue_action().await?;
                if let ContinueOutcome::Completed { option_id } = &outcome {
                    debug!(option_id = %option_id, "No incentive step for option");
                }
                if let Some(handle) = handle {
                    settle(handle).await;
                }
            }
            Command::Back => {
                self.controller.back().await?;
            }
            Command::Package(package_id) => {
                self.controller.toggle_package(&package_id).await?;
            }
            Command::Key { key, package_id } => match KeyActivation::from_key(&key) {
                Some(_) => {
                    self.controller.toggle_package(&package_id).await?;
                }
                None => debug!(key = %key, "Key ignored"),
            },
            Command::Offer => {
                self.controller.open_confirmation().await?;
            }
            Command::Confirm => self.controller.close_confirmation(true).await,
            Command::Close => self.controller.close_confirmation(false).await,
            Command::Retry => settle(self.controller.retry().await?).await,
            Command::Show => {}
            Command::Help => return Ok(Flow::Help),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Parse and apply one input line.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match parse_command(line)? {
            Some(command) => self.execute(command).await,
            None => Ok(Flow::Idle),
        }
    }

    /// Read commands from `input` until EOF or `quit`, printing the page after
    /// each one.
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        self.prefill_form().await;
        println!("{}", self.render().await);
        eprint!("> ");

        let mut lines = input.lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("Error reading stdin: {}", e);
                    break;
                }
            };

            match self.handle_line(&line).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => println!("\n{}", self.render().await),
                Ok(Flow::Help) => println!("{HELP}"),
                Ok(Flow::Idle) => {}
                Err(e) => eprintln!("{e}"),
            }
            eprint!("> ");
        }

        self.controller.shutdown().await;
        Ok(())
    }
}

async fn settle(handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        warn!(error = %e, "Load task did not finish");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::contract::fixtures;
    use crate::error::{Error, TransitionError};
    use crate::source::DirSource;
    use crate::wizard::WizardStep;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  ").unwrap(), None);
        assert_eq!(
            parse_command("scenario b").unwrap(),
            Some(Command::Scenario(Scenario::B))
        );
        assert_eq!(
            parse_command("set brand Apple").unwrap(),
            Some(Command::Set {
                field: "brand".into(),
                value: "Apple".into()
            })
        );
        assert_eq!(
            parse_command("set model  iPhone 12 Pro ").unwrap(),
            Some(Command::Set {
                field: "model".into(),
                value: "iPhone 12 Pro".into()
            })
        );
        assert_eq!(
            parse_command("key enter hybrid").unwrap(),
            Some(Command::Key {
                key: "enter".into(),
                package_id: "hybrid".into()
            })
        );
        assert_eq!(parse_command("QUIT").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse_command("fly"),
            Err(CommandError::Unknown("fly".into()))
        );
        assert!(matches!(
            parse_command("select"),
            Err(CommandError::MissingArgument { .. })
        ));
        assert!(matches!(
            parse_command("scenario C"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_command("set brand"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    async fn started_repl() -> (Repl, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("scenario_A.json", fixtures::SCENARIO_A),
            ("scenario_B.json", fixtures::SCENARIO_B),
            ("incentive_A.json", fixtures::INCENTIVE_A),
            ("incentive_B.json", fixtures::INCENTIVE_B),
        ] {
            std::fs::write(dir.path().join(name), body).unwrap();
        }
        let controller = WizardController::new(Arc::new(DirSource::new(dir.path())));
        controller.start().await.await.unwrap();
        (Repl::new(controller, PresentationMode::Standard), dir)
    }

    async fn run(repl: &mut Repl, line: &str) -> Result<Flow> {
        repl.handle_line(line).await
    }

    #[tokio::test]
    async fn bad_lines_surface_as_command_errors() {
        let (mut repl, _dir) = started_repl().await;

        assert_eq!(run(&mut repl, "   ").await.unwrap(), Flow::Idle);
        assert_eq!(run(&mut repl, "help").await.unwrap(), Flow::Help);
        assert!(matches!(
            run(&mut repl, "fly").await,
            Err(Error::Command(CommandError::Unknown(_)))
        ));
        assert!(matches!(
            run(&mut repl, "package").await,
            Err(Error::Command(CommandError::MissingArgument { .. }))
        ));
    }

    #[tokio::test]
    async fn form_follows_active_scenario_profile() {
        let (mut repl, _dir) = started_repl().await;
        repl.prefill_form().await;
        let a = fixtures::assessment(Scenario::A);
        assert_eq!(repl.form(), &ProfileForm::from_echo(&a.inputs_echo));

        run(&mut repl, "set brand Nokia").await.unwrap();
        assert_eq!(repl.form().brand, "Nokia");

        run(&mut repl, "scenario B").await.unwrap();
        let b = fixtures::assessment(Scenario::B);
        assert_eq!(repl.form().brand, b.inputs_echo.device.brand);
        assert_eq!(repl.form().submit().unwrap(), b.inputs_echo);
    }

    #[tokio::test]
    async fn selection_is_locked_on_incentive_step() {
        let (mut repl, _dir) = started_repl().await;
        run(&mut repl, "evaluate").await.unwrap();
        run(&mut repl, "select repair_battery").await.unwrap();
        run(&mut repl, "continue").await.unwrap();

        let err = run(&mut repl, "select refurb_buy").await.unwrap_err();

        assert!(matches!(
            err,
            Error::Transition(TransitionError::WrongStep { actual: 3, .. })
        ));
        let state = repl.controller().snapshot().await;
        assert_eq!(state.step, WizardStep::Incentive);
        assert_eq!(state.selected_option_id.as_deref(), Some("repair_battery"));
    }

    #[tokio::test]
    async fn full_flow_to_confirmation() {
        let (mut repl, _dir) = started_repl().await;

        run(&mut repl, "evaluate").await.unwrap();
        run(&mut repl, "select tradein_new").await.unwrap();
        run(&mut repl, "continue").await.unwrap();
        run(&mut repl, "key space carbon_points").await.unwrap();
        run(&mut repl, "offer").await.unwrap();

        let page = repl.render().await;
        assert!(page.contains("Teklif Özeti"));
        assert!(page.contains("Karbon Puan Paketi"));

        run(&mut repl, "confirm").await.unwrap();
        let state = repl.controller().snapshot().await;
        assert_eq!(state.step, WizardStep::Incentive);
        assert!(!state.confirmation_open);
        assert_eq!(state.selected_package_id.as_deref(), Some("carbon_points"));
    }

    #[tokio::test]
    async fn invalid_form_blocks_evaluate() {
        let (mut repl, _dir) = started_repl().await;

        run(&mut repl, "set battery_health_percent 140").await.unwrap();
        let err = run(&mut repl, "evaluate").await.unwrap_err();

        assert!(matches!(err, Error::Form(_)));
        assert_eq!(repl.controller().snapshot().await.step, WizardStep::Profile);
    }

    #[tokio::test]
    async fn other_keys_do_not_toggle() {
        let (mut repl, _dir) = started_repl().await;
        run(&mut repl, "evaluate").await.unwrap();
        run(&mut repl, "select repair_battery").await.unwrap();
        run(&mut repl, "continue").await.unwrap();

        run(&mut repl, "key tab cash").await.unwrap();
        assert_eq!(repl.controller().snapshot().await.selected_package_id, None);

        run(&mut repl, "key enter cash").await.unwrap();
        run(&mut repl, "key enter cash").await.unwrap();
        assert_eq!(repl.controller().snapshot().await.selected_package_id, None);
    }

    #[tokio::test]
    async fn untriggered_option_shows_completion() {
        let (mut repl, _dir) = started_repl().await;
        run(&mut repl, "scenario B").await.unwrap();
        run(&mut repl, "evaluate").await.unwrap();
        run(&mut repl, "select refurb_buy").await.unwrap();
        run(&mut repl, "continue").await.unwrap();

        let page = repl.render().await;
        assert!(page.contains("Akış tamamlandı: refurb_buy"));
        assert_eq!(repl.controller().snapshot().await.step, WizardStep::Results);
    }

    #[tokio::test]
    async fn offer_without_package_is_rejected() {
        let (mut repl, _dir) = started_repl().await;
        run(&mut repl, "evaluate").await.unwrap();
        run(&mut repl, "select repair_battery").await.unwrap();
        run(&mut repl, "continue").await.unwrap();

        let err = run(&mut repl, "offer").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transition(TransitionError::NothingSelected { .. })
        ));
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let (mut repl, _dir) = started_repl().await;
        let input: &[u8] = b"evaluate\nbogus\nquit\nselect repair_battery\n";

        repl.run(input).await.unwrap();

        let state = repl.controller().snapshot().await;
        assert_eq!(state.step, WizardStep::Results);
        assert_eq!(state.selected_option_id, None);
    }
}
