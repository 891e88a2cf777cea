//! # Console
//!
//! Line-oriented menu loop: print the menu, read a choice, run it, repeat.
//!
//! ## Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  loop {                                                                 │
//! │      print menu for the current session                                │
//! │      read " > " choice ─── end of input ──► return                     │
//! │      menu.select(choice)                                               │
//! │        ├── None          → show the menu again                          │
//! │        └── Some(action)  → prompt for arguments, call ShopService       │
//! │                             ├── Ok  → print result                      │
//! │                             └── Err → print message, keep going         │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input and output are generic so tests can drive the loop from a byte
//! buffer. Log lines go to stderr and never mix with this output.

use std::io::{self, BufRead, Write};
use tracing::debug;

use crate::error::ShopError;
use crate::menu::{Action, Menu};
use crate::service::{Profile, ShopService};
use shop_core::validation::parse_product_id;
use shop_core::Product;

/// Runs the menu loop until the input is exhausted.
///
/// ## Errors
/// Only I/O errors on `input` or `output` end the loop early.
pub async fn run_console<R, W>(
    service: &ShopService,
    menu: &Menu,
    mut input: R,
    mut output: W,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    loop {
        let authenticated = service.is_authenticated();
        writeln!(output)?;
        write!(output, "{}", menu.render(authenticated))?;

        let Some(choice) = prompt(&mut input, &mut output, " > ")? else {
            break;
        };

        let Some(action) = menu.select(&choice, authenticated) else {
            continue;
        };
        debug!(?action, "Menu action selected");

        let finished = match dispatch(service, action, &mut input, &mut output).await? {
            Outcome::Done => false,
            Outcome::Failed(err) => {
                writeln!(output, " {}", err)?;
                false
            }
            Outcome::EndOfInput => true,
        };

        if finished {
            break;
        }
    }

    writeln!(output)?;
    output.flush()
}

enum Outcome {
    Done,
    Failed(ShopError),
    EndOfInput,
}

impl From<ShopError> for Outcome {
    fn from(err: ShopError) -> Self {
        Outcome::Failed(err)
    }
}

/// Reads the arguments an action needs, runs it and prints the result.
async fn dispatch<R: BufRead, W: Write>(
    service: &ShopService,
    action: Action,
    input: &mut R,
    output: &mut W,
) -> io::Result<Outcome> {
    macro_rules! ask {
        ($label:expr) => {
            match prompt(input, output, $label)? {
                Some(line) => line,
                None => return Ok(Outcome::EndOfInput),
            }
        };
    }

    let outcome: Outcome = match action {
        Action::Login => {
            let username = ask!("> Username: ");
            let password = ask!("> Password: ");
            match service.login(&username, &password).await {
                Ok(user) => {
                    writeln!(output, " Welcome back, {}!", user.username)?;
                    Outcome::Done
                }
                Err(e) => e.into(),
            }
        }
        Action::Register => {
            let username = ask!("> Username: ");
            let password = ask!("> Password: ");
            match service.register(&username, &password).await {
                Ok(user) => {
                    writeln!(output, " Registered {}. You have {} points.", user.username, user.points)?;
                    Outcome::Done
                }
                Err(e) => e.into(),
            }
        }
        Action::RedeemTicket => {
            let code = ask!("> Ticket: ");
            match service.redeem_ticket(&code).await {
                Ok(redemption) => {
                    writeln!(
                        output,
                        " {} added. Balance: {}",
                        redemption.reward,
                        redemption.user.balance()
                    )?;
                    Outcome::Done
                }
                Err(e) => e.into(),
            }
        }
        Action::Buy => {
            let raw = ask!("> Product ID: ");
            match parse_product_id(&raw) {
                Err(e) => ShopError::validation(e.to_string()).into(),
                Ok(product_id) => match service.buy_product(product_id, 1).await {
                    Ok(purchase) => {
                        writeln!(
                            output,
                            " Thank you for buying {}! Balance: {}",
                            purchase.product.name,
                            purchase.user.balance()
                        )?;
                        Outcome::Done
                    }
                    Err(e) => e.into(),
                },
            }
        }
        Action::Profile => match service.view_profile().await {
            Ok(profile) => {
                write!(output, "{}", render_profile(&profile))?;
                Outcome::Done
            }
            Err(e) => e.into(),
        },
        Action::Products => match service.list_products().await {
            Ok(products) => {
                write!(output, "{}", render_products(&products))?;
                Outcome::Done
            }
            Err(e) => e.into(),
        },
        Action::Logout => {
            if let Some(user) = service.logout() {
                writeln!(output, " Goodbye, {}.", user.username)?;
            }
            Outcome::Done
        }
    };

    Ok(outcome)
}

/// Writes `label`, then reads one line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<Option<String>> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

// =============================================================================
// Tables
// =============================================================================

/// Left-aligned text table with a dashed rule under the headers.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(headers.iter().map(|h| h.to_string()).collect());
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        out.push_str(&line(row.clone()));
    }
    out
}

pub fn render_products(products: &[Product]) -> String {
    let rows: Vec<Vec<String>> = products
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.cost.to_string(),
                p.count.to_string(),
                p.name.clone(),
            ]
        })
        .collect();

    render_table(&["ID", "Cost", "Count", "Name"], &rows)
}

pub fn render_profile(profile: &Profile) -> String {
    let mut out = format!(
        " Your profile:\n {}\n Points: {}\n",
        profile.user.username, profile.user.points
    );

    if profile.orders.is_empty() {
        out.push_str(" You have no orders\n");
        return out;
    }

    let rows: Vec<Vec<String>> = profile
        .orders
        .iter()
        .map(|line| {
            vec![
                line.order.id.to_string(),
                line.product_name.clone(),
                line.order.quantity.to_string(),
                line.order.ordered_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();

    out.push_str(&render_table(&["ID", "Name", "Count", "Ordered at"], &rows));
    out
}
