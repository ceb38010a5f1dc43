use std::error::Error;

use dotenvy::dotenv;
use log::info;

use pow_ledger::{Blockchain, LedgerConfig, Transaction};

fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenv();
    env_logger::init();

    let config = LedgerConfig::from_env()?;
    println!(
        "⛓️ Starting ledger (difficulty {}, reward {})",
        config.difficulty, config.mining_reward
    );

    let mut bc = Blockchain::from_config(&config)?;
    let alice = match &config.miner_secret {
        Some(secret) => bc.curve().keypair_from_secret_hex(secret)?,
        None => {
            let key = bc.curve().generate_keypair();
            println!("new miner key, reuse with LEDGER_MINER_SECRET={}", key.secret_hex());
            key
        }
    };
    let bob = bc.curve().generate_keypair();
    info!("alice = {}", alice.address());
    info!("bob   = {}", bob.address());

    // Alice mines first so she has something to send.
    bc.mine_pending_transactions(&alice.address())?;
    bc.mine_pending_transactions(&alice.address())?;

    let mut tx = Transaction::transfer(alice.address(), bob.address(), 20);
    tx.sign(&alice, bc.curve())?;
    bc.add_transaction(tx)?;

    let block = bc.mine_pending_transactions(&bob.address())?;
    println!("mined block {} (nonce {})", block.hash, block.nonce);

    println!("balance of alice: {}", bc.get_balance_of_address(&alice.address()));
    println!("balance of bob:   {}", bc.get_balance_of_address(&bob.address()));
    println!("chain valid: {}", bc.is_blockchain_valid()?);
    println!("{}", serde_json::to_string_pretty(bc.chain())?);

    Ok(())
}
