//! Command handlers.
//!
//! Each handler performs one user action against the [`Enhancer`] and
//! returns a serializable view. `run` dispatches a parsed [`Command`] and
//! turns the view into the JSON printed on stdout.

use crate::cli::{Command, CredentialCommand, SettingsCommand, SettingsUpdate};
use crate::error::AppError;

use enhancer_core::config::CatalogModel;
use enhancer_core::executor::KeyProbe;
use enhancer_core::providers;
use enhancer_core::store::StateStore;
use enhancer_core::{EnhanceResponse, Enhancer};

use models::{Credential, EnhancementSettings, ProviderId};

use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

/// JSON to print, and whether the process should exit successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub json: Value,
    pub success: bool,
}

impl CommandOutput {
    fn ok(view: impl Serialize) -> Result<Self, AppError> {
        Ok(Self {
            json: to_json(view)?,
            success: true,
        })
    }
}

/// What is stored in the credential slot, without the secret itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialView {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl From<Option<&Credential>> for CredentialView {
    fn from(credential: Option<&Credential>) -> Self {
        Self {
            configured: credential.is_some(),
            kind: credential.map(Credential::kind),
            length: credential.map(|c| c.secret().len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsView {
    pub credits: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsView<'a> {
    pub provider: ProviderId,
    pub default_model: &'a str,
    pub models: &'a [CatalogModel],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeView {
    pub provider: ProviderId,
    pub result: KeyProbe,
    /// Inconclusive probes do not block saving the key.
    pub usable: bool,
}

pub async fn run<S: StateStore>(
    enhancer: &Enhancer<S>,
    command: Command,
) -> Result<CommandOutput, AppError> {
    match command {
        Command::Enhance {
            prompt,
            provider,
            model,
        } => {
            let response = enhance(enhancer, &prompt.join(" "), provider, model).await;
            Ok(CommandOutput {
                success: response.success,
                json: to_json(&response)?,
            })
        }
        Command::Settings(SettingsCommand::Show) => CommandOutput::ok(enhancer.settings().await?),
        Command::Settings(SettingsCommand::Set(update)) => {
            CommandOutput::ok(update_settings(enhancer, update).await?)
        }
        Command::Credential(CredentialCommand::Set { value }) => {
            let credential = enhancer.save_api_key_or_code(&value).await?;
            info!("Stored {}", credential.kind());
            CommandOutput::ok(CredentialView::from(Some(&credential)))
        }
        Command::Credential(CredentialCommand::Show) => {
            let credential = enhancer.credential().await?;
            CommandOutput::ok(CredentialView::from(credential.as_ref()))
        }
        Command::Credential(CredentialCommand::Clear) => {
            enhancer.clear_credential().await?;
            CommandOutput::ok(CredentialView::from(None))
        }
        Command::Stats => CommandOutput::ok(enhancer.stats().await?),
        Command::Credits => CommandOutput::ok(CreditsView {
            credits: enhancer.refresh_credits().await?,
        }),
        Command::Models { provider } => {
            let provider = resolve_provider(enhancer, provider.as_deref());
            CommandOutput::ok(ModelsView {
                provider,
                default_model: enhancer.default_model(provider),
                models: enhancer.models(provider),
            })
        }
        Command::ProbeKey {
            key,
            provider,
            model,
        } => {
            let result = enhancer
                .probe_api_key(&key, provider.as_deref(), model.as_deref())
                .await?;
            CommandOutput::ok(ProbeView {
                provider: resolve_provider(enhancer, provider.as_deref()),
                usable: result != KeyProbe::Rejected,
                result,
            })
        }
    }
}

pub async fn enhance<S: StateStore>(
    enhancer: &Enhancer<S>,
    prompt: &str,
    provider: Option<String>,
    model: Option<String>,
) -> EnhanceResponse {
    debug!("Enhance requested ({} chars)", prompt.len());
    enhancer
        .enhance(prompt, provider.as_deref(), model.as_deref())
        .await
}

/// Merge `update` into the stored settings and save the result.
pub async fn update_settings<S: StateStore>(
    enhancer: &Enhancer<S>,
    update: SettingsUpdate,
) -> Result<EnhancementSettings, AppError> {
    let mut settings = enhancer.settings().await?;
    apply_update(&mut settings, update);
    enhancer.save_settings(&settings).await?;
    Ok(settings)
}

pub fn apply_update(settings: &mut EnhancementSettings, update: SettingsUpdate) {
    if let Some(role) = update.role {
        settings.role = role.trim().to_string();
    }
    if let Some(description) = update.description {
        settings.description = description;
    }
    if let Some(length) = update.length {
        settings.length = length;
    }
    if let Some(format) = update.format {
        settings.format = format;
    }
    if let Some(tone) = update.tone {
        settings.tone = tone;
    }
}

fn resolve_provider<S: StateStore>(enhancer: &Enhancer<S>, provider: Option<&str>) -> ProviderId {
    provider
        .map(|name| providers::lookup_str(name).id)
        .unwrap_or(enhancer.config().providers.default_provider)
}

#[track_caller]
fn to_json(view: impl Serialize) -> Result<Value, AppError> {
    serde_json::to_value(view).map_err(|e| AppError::app(format!("Failed to serialize output: {e}")))
}
