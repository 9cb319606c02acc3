/// GraphQL documents shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTemplate {
    Demarche,
    Dossier,
    /// Every mutation used by the actions; the operation name picks one.
    Actions,
}

impl QueryTemplate {
    pub fn text(self) -> &'static str {
        match self {
            QueryTemplate::Demarche => include_str!("../../queries/demarche.graphql"),
            QueryTemplate::Dossier => include_str!("../../queries/dossier.graphql"),
            QueryTemplate::Actions => include_str!("../../queries/actions.graphql"),
        }
    }
}
