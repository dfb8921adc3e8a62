use crate::{
    cli::actions::run::print_json,
    client::{ApiClient, RequestError},
    inventory::{MovementInput, Price, Product, ProductInput},
};

/// Fields given on `products update`; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub quantidade: Option<u32>,
    pub estoque_minimo: Option<u32>,
    pub preco: Option<Price>,
}

impl ProductChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay the changes on the current product.
    #[must_use]
    pub fn apply(self, current: &Product) -> ProductInput {
        let mut input = ProductInput::from(current);
        if let Some(nome) = self.nome {
            input.nome = nome;
        }
        if let Some(descricao) = self.descricao {
            input.descricao = Some(descricao);
        }
        if let Some(quantidade) = self.quantidade {
            input.quantidade = quantidade;
        }
        if let Some(estoque_minimo) = self.estoque_minimo {
            input.estoque_minimo = estoque_minimo;
        }
        if let Some(preco) = self.preco {
            input.preco = Some(preco);
        }
        input
    }
}

#[derive(Debug)]
pub enum ProductAction {
    List { search: Option<String> },
    Get { id: i64 },
    Create(ProductInput),
    Update { id: i64, changes: ProductChanges },
    Delete { id: i64 },
}

#[derive(Debug)]
pub enum MovementAction {
    List,
    Create(MovementInput),
}

#[derive(Debug)]
pub enum AlertAction {
    List,
    Read { id: i64 },
}

pub async fn products(client: &ApiClient, action: ProductAction) -> Result<(), RequestError> {
    match action {
        ProductAction::List { search } => {
            print_json(&client.list_products(search.as_deref()).await?)
        }
        ProductAction::Get { id } => print_json(&client.get_product(id).await?),
        ProductAction::Create(input) => {
            input.validate()?;
            print_json(&client.create_product(&input).await?)
        }
        ProductAction::Update { id, changes } => {
            let current = client.get_product(id).await?;
            if changes.is_empty() {
                return print_json(&current);
            }
            let input = changes.apply(&current);
            input.validate()?;
            print_json(&client.update_product(id, &input).await?)
        }
        ProductAction::Delete { id } => {
            print_json(&client.delete_product(id).await?.into_value())
        }
    }
}

pub async fn movements(client: &ApiClient, action: MovementAction) -> Result<(), RequestError> {
    match action {
        MovementAction::List => print_json(&client.list_movements().await?),
        MovementAction::Create(input) => {
            input.validate()?;
            print_json(&client.create_movement(&input).await?)
        }
    }
}

pub async fn alerts(client: &ApiClient, action: AlertAction) -> Result<(), RequestError> {
    match action {
        AlertAction::List => print_json(&client.list_alerts().await?),
        AlertAction::Read { id } => print_json(&client.mark_alert_read(id).await?.into_value()),
    }
}

pub async fn dashboard(client: &ApiClient) -> Result<(), RequestError> {
    print_json(&client.dashboard().await?)
}
