//! Print what the server offers.

use anyhow::Result;

use crate::wps::WpsClient;

pub async fn describe(endpoint: &str) -> Result<()> {
    let client = WpsClient::new(endpoint);
    let info = client.capabilities().await?;

    println!("Server:   {} ({})", info.title, info.service_type);
    if !info.description.is_empty() {
        println!("Abstract: {}", info.description);
    }

    println!();
    println!("Operations:");
    for operation in &info.operations {
        println!("  {}", operation);
    }

    println!();
    println!("Processes:");
    for process in &info.processes {
        println!("  {} - {}", process.identifier, process.title);
        if !process.description.is_empty() {
            println!("      {}", process.description);
        }
    }

    Ok(())
}

pub async fn process(endpoint: &str, name: &str) -> Result<()> {
    let client = WpsClient::new(endpoint);
    let description = client.describe_process(name).await?;

    println!("{} - {}", description.identifier, description.title);
    if !description.description.is_empty() {
        println!("{}", description.description);
    }

    println!();
    println!("Inputs:");
    for input in &description.inputs {
        println!(
            "  {} ({}, occurs {}..{})",
            input.identifier, input.data_type, input.min_occurs, input.max_occurs
        );
    }

    println!();
    println!("Outputs:");
    for output in &description.outputs {
        println!("  {} ({})", output.identifier, output.data_type);
    }

    Ok(())
}
