use anyhow::{Context, Result};
use serde_json::json;

use crate::config::api_url;

/// POST a JSON body and fail with the server's error message on non-2xx
async fn post(path: &str, body: serde_json::Value) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}{}", api_url(), path))
        .json(&body)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to API: {}", e))?;

    check(response).await
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: serde_json::Value = response.json().await.unwrap_or_default();
    match body["error"].as_str() {
        Some(message) => anyhow::bail!("API error ({}): {}", status, message),
        None => anyhow::bail!("API error: {}", status),
    }
}

pub async fn run_create(name: String) -> Result<()> {
    let response = post("/api/channels", json!({ "name": name })).await?;
    let channel: serde_json::Value = response.json().await?;

    println!("✓ Channel '{}' created", name);
    println!("  ID:             {}", channel["ID"]);
    println!("  Table:          {}", channel["TableARN"].as_str().unwrap_or("-"));
    println!("  Queue:          {}", channel["QueueARN"].as_str().unwrap_or("-"));
    println!("  Endpoint topic: {}", channel["EndpointTopicARN"].as_str().unwrap_or("-"));
    println!("  Subscription:   {}", channel["SubscriptionARN"].as_str().unwrap_or("-"));

    Ok(())
}

pub async fn run_delete(channel: String) -> Result<()> {
    let body = if channel.parse::<i64>().is_ok() {
        json!({ "id": channel })
    } else {
        json!({ "name": channel })
    };
    post("/api/channels/delete", body).await?;

    println!("✓ Channel '{}' deleted", channel);
    Ok(())
}

pub async fn run_rename(channel: String, new_name: String, account: String) -> Result<()> {
    let body = json!({
        "channel": channel,
        "account": account,
        "request": {
            "action": "ChangeChannelName",
            "parameters": [{ "name": new_name }]
        }
    });
    post("/api/channels/update", body).await?;

    println!("✓ Channel '{}' renamed to '{}'", channel, new_name);
    Ok(())
}

pub async fn run_list(output: String) -> Result<()> {
    let response = reqwest::get(format!("{}/api/channels?type=all", api_url()))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to API: {}", e))?;
    let channels: Vec<serde_json::Value> = check(response)
        .await?
        .json()
        .await
        .context("Failed to parse channel list")?;

    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&channels)?);
        return Ok(());
    }

    println!("{:<6} {:<20} {:<40}", "ID", "ALIAS", "QUEUE");
    println!("{}", "-".repeat(70));

    for channel in &channels {
        let id = channel["ID"].as_i64().unwrap_or(0);
        let alias = channel["Alias"].as_str().unwrap_or("-");
        let queue = channel["QueueARN"].as_str().unwrap_or("-");
        println!("{:<6} {:<20} {:<40}", id, alias, queue);
    }

    println!();
    println!("{} channel(s) found", channels.len());

    Ok(())
}

pub async fn run_publish(
    channel: String,
    message: String,
    account: i64,
    timestamp: Option<i64>,
) -> Result<()> {
    let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let body = json!({
        "message": message,
        "channel": channel,
        "account": account.to_string(),
        "timestamp": timestamp.to_string()
    });
    let response = post("/api/messages", body).await?;
    let published: serde_json::Value = response.json().await?;

    println!("✓ Published to '{}'", channel);
    println!("  Message ID: {}", published["message_id"].as_str().unwrap_or("-"));
    Ok(())
}
