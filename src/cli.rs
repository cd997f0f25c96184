// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Record id")
}

fn flow_command(name: &'static str, about: &'static str, with_kind: bool) -> Command {
    let mut add = Command::new("add")
        .about("Record a new entry")
        .arg(req("ticker", "Ticker symbol, e.g. HGLG11"))
        .arg(req("price", "Cost price per unit"))
        .arg(req("qty", "Whole number of units"))
        .arg(req("date", "YYYY-MM-DD, not in the future"))
        .arg(opt("broker", "Broker name"))
        .arg(opt("tax", "Fees and taxes (default 0)"));
    if with_kind {
        add = add.arg(
            Arg::new("kind")
                .long("kind")
                .default_value("purchase")
                .help("purchase|subscription"),
        );
    }
    Command::new(name)
        .about(about)
        .subcommand_required(true)
        .subcommand(add)
        .subcommand(
            Command::new("edit")
                .about("Change fields of an entry; ticker quantity is not adjusted")
                .arg(id_arg())
                .arg(opt("price", "Cost price per unit"))
                .arg(opt("qty", "Whole number of units"))
                .arg(opt("date", "YYYY-MM-DD"))
                .arg(opt("broker", "Broker name"))
                .arg(opt("tax", "Fees and taxes")),
        )
        .subcommand(Command::new("rm").about("Delete an entry").arg(id_arg()))
}

pub fn build_cli() -> Command {
    Command::new("quotaledger")
        .about("Investment ledger with cached portfolio and dividend metrics")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the database and print its path"))
        .subcommand(
            Command::new("currency")
                .about("Manage currencies")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(req("code", "Three-letter code, e.g. BRL"))
                        .arg(req("name", "Display name"))
                        .arg(opt("rate", "Exchange rate")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(req("code", "Currency code"))),
        )
        .subcommand(
            Command::new("broker")
                .about("Manage brokers")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Broker name"))
                        .arg(opt("account", "Account number"))
                        .arg(opt("country", "Country"))
                        .arg(opt("currency", "Currency code"))
                        .arg(opt("description", "Free text")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(req("name", "Broker name"))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage ticker categories")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(req("title", "Category title, e.g. FII"))
                        .arg(opt("description", "Free text")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rename")
                        .arg(req("from", "Current title"))
                        .arg(req("to", "New title")),
                )
                .subcommand(Command::new("rm").arg(req("title", "Category title"))),
        )
        .subcommand(
            Command::new("ticker")
                .about("Manage tickers")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Ticker symbol"))
                        .arg(req("category", "Category title"))
                        .arg(req("currency", "Currency code"))
                        .arg(opt("sector", "Sector"))
                        .arg(opt("description", "Free text")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(opt("category", "Only tickers in this category")),
                ))
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Quantity, net cost basis and average price")
                        .arg(req("name", "Ticker symbol"))
                        .arg(opt("as-of", "Only flows on or before YYYY-MM-DD")),
                ))
                .subcommand(Command::new("rm").arg(req("name", "Ticker symbol"))),
        )
        .subcommand(flow_command("inflow", "Purchases and subscriptions", true))
        .subcommand(flow_command("outflow", "Sales", false))
        .subcommand(
            Command::new("dividend")
                .about("Dividend payments and announcements")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(req("ticker", "Ticker symbol"))
                        .arg(req("value", "Amount per quota (up to 10 decimals)"))
                        .arg(req("date", "Payment date YYYY-MM-DD"))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .default_value("BRL")
                                .help("Settlement currency"),
                        )
                        .arg(opt("quotas", "Quota count; derived from inflows when omitted or 0"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("dividend")
                                .help("dividend|equity-interest|amortization"),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(opt("value", "Amount per quota"))
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("quotas", "Quota count; 0 derives it again"))
                        .arg(opt("type", "dividend|equity-interest|amortization")),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("ticker", "Ticker symbol"))
                        .arg(opt("year", "Calendar year"))
                        .arg(opt("month", "Month number 1-12"))
                        .arg(opt("currency", "Settlement currency")),
                ))
                .subcommand(
                    Command::new("declare")
                        .about("Record an announced future payment")
                        .arg(req("ticker", "Ticker symbol"))
                        .arg(req("value", "Value per share"))
                        .arg(req("payment-date", "YYYY-MM-DD")),
                )
                .subcommand(json_flags(Command::new("declared"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Negotiation history")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("list")
                        .about("Inflows and outflows, newest first")
                        .arg(opt("ticker", "Ticker symbol"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Portfolio metrics")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("total").about("Capital deployed across every inflow"),
                ))
                .subcommand(json_flags(
                    Command::new("by-currency").about("Inflow totals per ticker currency"),
                ))
                .subcommand(json_flags(
                    Command::new("by-broker").about("Inflow totals per broker"),
                ))
                .subcommand(json_flags(
                    Command::new("categories").about("Invested amount per category"),
                ))
                .subcommand(json_flags(
                    Command::new("category")
                        .about("Invested amount and ticker count of one category")
                        .arg(req("title", "Category title")),
                ))
                .subcommand(json_flags(
                    Command::new("monthly")
                        .about("Inflow totals per month for one currency")
                        .arg(req("currency", "Currency code")),
                ))
                .subcommand(json_flags(
                    Command::new("window").about("Months of the rolling dividend window"),
                ))
                .subcommand(json_flags(
                    Command::new("dividends-category")
                        .about("Category dividends over the rolling window")
                        .arg(req("title", "Category title")),
                ))
                .subcommand(json_flags(
                    Command::new("dividends-currency")
                        .about("Dividends per year and month for one settlement currency")
                        .arg(req("currency", "Currency code")),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("tx")
                        .about("Negotiation history")
                        .arg(req("format", "csv|json"))
                        .arg(req("out", "Output path")),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check ticker quantities against flow history and purge expired cache rows")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite mismatched quantities"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Runtime settings")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(req("key", "locale|cache_ttl_secs|tracked_currencies"))
                        .arg(req("value", "New value")),
                )
                .subcommand(Command::new("clear-cache").about("Drop every cached metric")),
        )
}
