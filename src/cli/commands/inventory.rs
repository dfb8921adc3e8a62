use crate::inventory::Price;
use clap::{Arg, ArgAction, Command, builder::PossibleValuesParser};

pub const CMD_PRODUCTS: &str = "products";
pub const CMD_MOVEMENTS: &str = "movements";
pub const CMD_ALERTS: &str = "alerts";
pub const CMD_DASHBOARD: &str = "dashboard";

pub const CMD_LIST: &str = "list";
pub const CMD_GET: &str = "get";
pub const CMD_CREATE: &str = "create";
pub const CMD_UPDATE: &str = "update";
pub const CMD_DELETE: &str = "delete";
pub const CMD_READ: &str = "read";

pub const ARG_ID: &str = "id";
pub const ARG_SEARCH: &str = "search";
pub const ARG_NAME: &str = "nome";
pub const ARG_DESCRIPTION: &str = "descricao";
pub const ARG_QUANTITY: &str = "quantidade";
pub const ARG_MIN_STOCK: &str = "estoque-minimo";
pub const ARG_PRICE: &str = "preco";
pub const ARG_PRODUCT: &str = "produto";
pub const ARG_KIND: &str = "tipo";
pub const ARG_NOTE: &str = "observacao";

fn id_arg(help: &'static str) -> Arg {
    Arg::new(ARG_ID)
        .help(help)
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

fn product_field_args(command: Command, create: bool) -> Command {
    command
        .arg(
            Arg::new(ARG_NAME)
                .long("nome")
                .help("Product name")
                .required(create),
        )
        .arg(
            Arg::new(ARG_DESCRIPTION)
                .long("descricao")
                .help("Free text description"),
        )
        .arg(
            Arg::new(ARG_QUANTITY)
                .long("quantidade")
                .help("Units in stock")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_MIN_STOCK)
                .long("estoque-minimo")
                .help("Minimum units before the product is flagged for restock")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_PRICE)
                .long("preco")
                .help("Unit price")
                .value_parser(clap::value_parser!(Price)),
        )
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_PRODUCTS)
                .about("Manage products")
                .subcommand_required(true)
                .subcommand(
                    Command::new(CMD_LIST).about("List products").arg(
                        Arg::new(ARG_SEARCH)
                            .short('s')
                            .long("search")
                            .help("Filter by name or description"),
                    ),
                )
                .subcommand(
                    Command::new(CMD_GET)
                        .about("Show one product")
                        .arg(id_arg("Product id")),
                )
                .subcommand(product_field_args(
                    Command::new(CMD_CREATE).about("Create a product"),
                    true,
                ))
                .subcommand(product_field_args(
                    Command::new(CMD_UPDATE)
                        .about("Change a product; omitted fields keep their current value")
                        .arg(id_arg("Product id")),
                    false,
                ))
                .subcommand(
                    Command::new(CMD_DELETE)
                        .about("Delete a product")
                        .arg(id_arg("Product id")),
                ),
        )
        .subcommand(
            Command::new(CMD_MOVEMENTS)
                .about("Stock entries and withdrawals")
                .subcommand_required(true)
                .subcommand(Command::new(CMD_LIST).about("List stock movements"))
                .subcommand(
                    Command::new(CMD_CREATE)
                        .about("Record a stock movement")
                        .arg(
                            Arg::new(ARG_PRODUCT)
                                .long("produto")
                                .help("Product id")
                                .required(true)
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            Arg::new(ARG_KIND)
                                .long("tipo")
                                .help("Movement direction")
                                .required(true)
                                .value_parser(PossibleValuesParser::new(["entrada", "saida"])),
                        )
                        .arg(
                            Arg::new(ARG_QUANTITY)
                                .long("quantidade")
                                .help("Units moved")
                                .required(true)
                                .value_parser(clap::value_parser!(u32).range(1..)),
                        )
                        .arg(
                            Arg::new(ARG_NOTE)
                                .long("observacao")
                                .help("Optional note")
                                .action(ArgAction::Set),
                        ),
                ),
        )
        .subcommand(
            Command::new(CMD_ALERTS)
                .about("Low-stock alerts")
                .subcommand_required(true)
                .subcommand(Command::new(CMD_LIST).about("List unread alerts"))
                .subcommand(
                    Command::new(CMD_READ)
                        .about("Mark an alert as read")
                        .arg(id_arg("Alert id")),
                ),
        )
        .subcommand(Command::new(CMD_DASHBOARD).about("Stock summary and recent alerts"))
}
