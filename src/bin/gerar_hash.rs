// src/bin/gerar_hash.rs
//
// Gera os hashes bcrypt do arquivo de credenciais: uma senha por linha
// na entrada padrão, um hash por linha na saída.

use std::io::{self, BufRead, Write};

fn main() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let password = line?;
        let password = password.trim_end_matches('\r');
        if password.is_empty() {
            continue;
        }
        let hashed = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        writeln!(stdout, "{}", hashed)?;
    }

    Ok(())
}
