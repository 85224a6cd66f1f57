//! MT Inspect - CLI tool for examining SWIFT MT interchange messages.

use clap::Parser;
use std::fs::File;
use std::io::{self, Read};
use swift_mt::envelope::ApplicationHeader;
use swift_mt::{Document, Message, MessageClass, Result};

#[derive(Parser)]
#[command(name = "mt_inspect")]
#[command(about = "Inspect SWIFT MT messages (envelope, type, document summary)", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Print the raw body fields instead of the document summary
    #[arg(long)]
    fields: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let message = if let Some(ref input_path) = cli.input {
        let mut file = File::open(input_path)?;
        Message::from_read(&mut file)?
    } else {
        let mut stdin = io::stdin();
        Message::from_read(&mut stdin)?
    };

    println!("Sender BIC:   {}", message.basic.bic());
    if let ApplicationHeader::Input(header) = &message.application {
        println!("Receiver:     {}", header.receiver);
    }
    println!("Direction:    {:?}", message.direction());
    match message.message_type() {
        Some(mt) => println!("Message type: {}", mt),
        None => println!("Message type: MT{} (unsupported)", message.application.message_type()),
    }
    if let Some(user) = &message.user {
        if let Some(mur) = user.message_user_reference() {
            println!("User ref:     {}", mur);
        }
    }
    if let Some(trailer) = &message.trailer {
        if let Some(chk) = trailer.checksum() {
            println!("Checksum:     {}", chk);
        }
    }

    if cli.fields {
        println!("---");
        for field in &message.fields()? {
            println!(":{}:{}", field.tag, field.value);
        }
        return Ok(());
    }

    if message.classify() == MessageClass::Unsupported {
        return Ok(());
    }

    println!("---");
    summarize(&message.document()?);
    Ok(())
}

fn summarize(document: &Document) {
    match document {
        Document::CustomerCreditTransfer(doc) => {
            println!("Reference:    {}", doc.reference);
            println!("Value date:   {}", doc.value_date);
            println!(
                "Amount:       {} {} ({})",
                doc.amount.currency,
                doc.amount.value,
                doc.charges.as_str()
            );
        }
        Document::OwnAccountTransfer(doc) => {
            println!("Reference:    {}", doc.reference);
            println!("Value date:   {}", doc.value_date);
            println!("Amount:       {} {}", doc.amount.currency, doc.amount.value);
        }
        Document::InstitutionTransfer(doc) => {
            println!("Reference:    {}", doc.reference);
            println!("Related ref:  {}", doc.related_reference);
            println!("Amount:       {} {}", doc.amount.currency, doc.amount.value);
        }
        Document::Batch(doc) => {
            println!("Reference:    {}", doc.reference);
            println!("Transactions: {}", doc.transactions.len());
            println!("Settlement:   {}", doc.settlement_sum());
        }
        Document::Statement(doc) => {
            println!("Account:      {}", doc.account);
            if let Some(number) = &doc.statement_number {
                println!("Statement no: {}", number);
            }
            println!("Lines:        {}", doc.transactions.len());
            if let Some(closing) = &doc.closing {
                println!(
                    "Closing:      {} {} {}",
                    closing.debit_credit.as_str(),
                    closing.currency,
                    closing.amount
                );
            }
        }
        Document::Confirmation(doc) => {
            println!("Kind:         {:?}", doc.kind);
            println!("Reference:    {}", doc.reference);
            println!("Related ref:  {}", doc.related_reference);
            println!("Value date:   {}", doc.value_date);
            println!("Amount:       {} {}", doc.amount.currency, doc.amount.value);
        }
    }
}
