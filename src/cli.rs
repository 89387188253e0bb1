// Copyright (c) 2025 Nidhi Authors.
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
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("nidhi")
        .about("Multi-currency (USD/INR) personal finance: accounts, transfers, budgets, fixed deposits")
        .version(clap::crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("profile")
                .about("Manage profiles (each profile owns its own ledger)")
                .subcommand(
                    Command::new("add")
                        .about("Create a profile and make it active")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(Command::new("list").about("List profiles"))
                .subcommand(
                    Command::new("use")
                        .about("Switch the active profile")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("currency")
                        .about("Set the active profile's display currency")
                        .arg(Arg::new("currency").required(true).value_parser(["USD", "INR"])),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a profile and everything it owns")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser([
                                    "checking",
                                    "savings",
                                    "credit_card",
                                    "loan",
                                    "investment",
                                ]),
                        )
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .required(true)
                                .value_parser(["USD", "INR"]),
                        )
                        .arg(
                            Arg::new("balance")
                                .long("balance")
                                .default_value("0")
                                .help("Initial balance in the account's currency"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List accounts with balances and total value"),
                ))
                .subcommand(
                    Command::new("edit")
                        .about("Rename an account or change its type/currency")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("new-name").long("new-name"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser([
                                    "checking",
                                    "savings",
                                    "credit_card",
                                    "loan",
                                    "investment",
                                ]),
                        )
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .value_parser(["USD", "INR"]),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an account, its transactions, and its fixed deposits")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("set-order")
                        .about("Set the display order of an account")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("order")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("update-balance")
                        .about("Correct an investment account's balance to a target figure")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("target").long("target").required(true))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .value_parser(["USD", "INR"])
                                .help("Currency the target is entered in (defaults to the account's)"),
                        ),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage spending categories")
                .subcommand(
                    Command::new("add")
                        .about("Create a custom category")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a custom category (built-ins cannot be removed)")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and inspect transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["expense", "income"]),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("my-share")
                                .long("my-share")
                                .help("Personal portion of a shared amount; 0 or omitted = full amount"),
                        )
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("date").long("date").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("my-share").long("my-share"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("date").long("date")),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("transfer")
                .about("Move money between two of your accounts")
                .arg(Arg::new("from").long("from").required(true))
                .arg(Arg::new("to").long("to").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("date").long("date").required(true))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(
            Command::new("fd")
                .about("Manage fixed deposits (INR accounts only)")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(Arg::new("principal").long("principal").required(true))
                        .arg(
                            Arg::new("rate")
                                .long("rate")
                                .required(true)
                                .value_parser(value_parser!(f64))
                                .help("Annual interest rate in percent, e.g. 7.5"),
                        )
                        .arg(Arg::new("start").long("start").required(true))
                        .arg(Arg::new("maturity").long("maturity").required(true))
                        .arg(Arg::new("bank").long("bank"))
                        .arg(Arg::new("number").long("number").help("FD number/reference"))
                        .arg(
                            Arg::new("no-debit")
                                .long("no-debit")
                                .action(ArgAction::SetTrue)
                                .help("Do not debit the principal from the linked account"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("show").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Correct a deposit's terms (the funding debit is not adjusted)")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("principal").long("principal"))
                        .arg(
                            Arg::new("rate")
                                .long("rate")
                                .value_parser(value_parser!(f64)),
                        )
                        .arg(Arg::new("start").long("start"))
                        .arg(Arg::new("maturity").long("maturity"))
                        .arg(Arg::new("bank").long("bank"))
                        .arg(Arg::new("number").long("number")),
                )
                .subcommand(
                    Command::new("mark-matured")
                        .about("Mark a deposit matured/closed (manual status, never automatic)")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budget targets and comparisons")
                .subcommand(
                    Command::new("create")
                        .about("Create a budget and make it the active one")
                        .arg(Arg::new("name").long("name").default_value("Monthly Budget"))
                        .arg(Arg::new("income").long("income").default_value("0"))
                        .arg(Arg::new("savings").long("savings").default_value("0"))
                        .arg(Arg::new("investments").long("investments").default_value("0"))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .default_value("USD")
                                .value_parser(["USD", "INR"]),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("show").about("Active budget vs this month's actuals"),
                ))
                .subcommand(
                    Command::new("activate")
                        .about("Make a budget the single active one")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a budget, its items, and its account goals")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("item")
                        .about("Per-category expense targets on the active budget")
                        .subcommand(
                            Command::new("add")
                                .arg(Arg::new("category").long("category").required(true))
                                .arg(Arg::new("amount").long("amount").required(true)),
                        )
                        .subcommand(
                            Command::new("rm")
                                .arg(Arg::new("category").long("category").required(true)),
                        ),
                )
                .subcommand(
                    Command::new("goal")
                        .about("Per-account monthly contribution targets on the active budget")
                        .subcommand(
                            Command::new("add")
                                .arg(Arg::new("account").long("account").required(true))
                                .arg(Arg::new("amount").long("amount").required(true)),
                        )
                        .subcommand(
                            Command::new("rm")
                                .arg(Arg::new("account").long("account").required(true)),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregated views (figures in USD unless noted)")
                .subcommand(json_flags(
                    Command::new("monthly")
                        .about("Income, expenses by category, budget comparison, contributions")
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .value_parser(value_parser!(u32)),
                        ),
                ))
                .subcommand(json_flags(Command::new("net-worth")))
                .subcommand(json_flags(Command::new("currency-summary"))),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Accounts, total value, and month-to-date personal spending"),
        )
        .subcommand(
            Command::new("fx")
                .about("Exchange rate utilities")
                .subcommand(Command::new("rate").about("Show the current USD->INR rate"))
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").required(true))
                        .arg(
                            Arg::new("from")
                                .long("from")
                                .required(true)
                                .value_parser(["USD", "INR"]),
                        )
                        .arg(
                            Arg::new("to")
                                .long("to")
                                .required(true)
                                .value_parser(["USD", "INR"]),
                        ),
                ),
        )
        .subcommand(
            Command::new("backup")
                .about("Database snapshots")
                .subcommand(Command::new("now").about("Take a snapshot immediately"))
                .subcommand(Command::new("list")),
        )
}
