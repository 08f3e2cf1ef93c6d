use std::path::Path;

use fourk_core::api::uploads::{prepend_parts_data_ids, FileUpload, SendLog, SendTarget};
use fourk_core::auth::{has_permission, Permission};
use fourk_core::models::WireScalar;
use fourk_core::util::normalize_text_option;

use crate::commands::common::{load_context, CommandContext};
use crate::error::CliError;

pub struct SendOptions<'a> {
    pub target: &'a SendTarget,
    pub file: &'a Path,
    pub client_id: Option<String>,
    pub include_processed: bool,
}

/// Order and transfer ids already processed on the backend.
#[derive(Debug, Default)]
pub struct ProcessedBatch {
    pub order_ids: Vec<WireScalar>,
    pub transfer_ids: Vec<WireScalar>,
}

pub async fn run_send(
    options: SendOptions<'_>,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let context = load_context(global_profile)?;
    if !context.session.is_authenticated() {
        return Err(CliError::NotSignedIn);
    }

    let user = context.client.current_user(&context.session).await?;
    if !has_permission(Some(&user), Permission::UploadFiles) {
        return Err(CliError::PermissionDenied(Permission::UploadFiles));
    }

    let file_name = upload_file_name(options.file)?;
    let content = std::fs::read(options.file)?;
    let client_id = normalize_text_option(options.client_id).or_else(|| user.client_id.clone());

    let batch = if wants_processed_ids(options.target, options.include_processed) {
        Some(fetch_processed_batch(&context).await?)
    } else {
        None
    };
    let content = match &batch {
        Some(batch) => {
            let text = String::from_utf8(content)
                .map_err(|_| CliError::NotText(options.file.display().to_string()))?;
            prepend_parts_data_ids(&text, &batch.order_ids, &batch.transfer_ids).into_bytes()
        }
        None => content,
    };

    let upload = FileUpload {
        file_name: file_name.clone(),
        content,
        target_client_id: client_id.clone(),
    };
    let result = context
        .client
        .send_file(&context.session, options.target, &upload)
        .await;

    let log = SendLog {
        file_type: options.target.file_type().to_string(),
        filename: file_name.clone(),
        client_id,
        success: result.is_ok(),
        message: result
            .is_ok()
            .then(|| format!("Sent to {}", options.target.partner())),
        error: result.as_ref().err().map(ToString::to_string),
    };
    context.client.record_send_log(&context.session, &log).await;
    result?;

    if let Some(batch) = batch {
        mark_batch_sent(&context, &batch).await?;
        println!(
            "Marked {} orders and {} transfers as sent",
            batch.order_ids.len(),
            batch.transfer_ids.len()
        );
    }

    println!("Sent {} to {}", file_name, options.target.partner());
    Ok(())
}

/// Processed ids only apply to parts data sent to John Deere.
pub fn wants_processed_ids(target: &SendTarget, include_processed: bool) -> bool {
    include_processed && *target == SendTarget::JohnDeerePartsData
}

async fn fetch_processed_batch(context: &CommandContext) -> Result<ProcessedBatch, CliError> {
    let order_ids = context
        .client
        .processed_order_ids(&context.session)
        .await?;
    let transfer_ids = context
        .client
        .processed_transfer_ids(&context.session)
        .await?;
    tracing::info!(
        "Prefixing {} processed orders and {} processed transfers",
        order_ids.len(),
        transfer_ids.len()
    );
    Ok(ProcessedBatch {
        order_ids,
        transfer_ids,
    })
}

async fn mark_batch_sent(context: &CommandContext, batch: &ProcessedBatch) -> Result<(), CliError> {
    if !batch.order_ids.is_empty() {
        context
            .client
            .mark_orders_sent(&context.session, &batch.order_ids)
            .await?;
    }
    if !batch.transfer_ids.is_empty() {
        context
            .client
            .mark_transfers_sent(&context.session, &batch.transfer_ids)
            .await?;
    }
    Ok(())
}

pub fn upload_file_name(path: &Path) -> Result<String, CliError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| CliError::Config(format!("Invalid file path: {}", path.display())))
}
