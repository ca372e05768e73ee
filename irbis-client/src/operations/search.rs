use super::{check, Operation};
use irbis_protocol::{
    ClientQuery, Command, FoundLine, ProtocolError, SearchParameters, ServerResponse,
    TextEncoding,
};

/// Dictionary search (`K`).
///
/// The expression travels as UTF-8; the reply lines are `mfn` or
/// `mfn#description` when a format was requested.
#[derive(Debug, Clone)]
pub struct Search {
    pub database: String,
    pub parameters: SearchParameters,
    /// Encoding of the found lines.
    pub encoding: TextEncoding,
}

/// Reply to [`Search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    /// Total number of records matching the expression.
    pub total: u32,
    /// The requested page of found lines.
    pub found: Vec<FoundLine>,
}

impl Search {
    pub fn new(database: impl Into<String>, parameters: SearchParameters) -> Self {
        Self {
            database: database.into(),
            parameters,
            encoding: TextEncoding::Ansi,
        }
    }

    /// Reads formatted descriptions as UTF-8.
    pub fn with_descriptions(mut self) -> Self {
        self.encoding = TextEncoding::Utf8;
        self
    }
}

impl Operation for Search {
    type Output = SearchHits;

    fn command(&self) -> Command {
        Command::Search
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        let p = &self.parameters;
        query
            .append_narrow(self.database.as_str())?
            .append_wide(p.expression.as_str())
            .append_int(p.number)
            .append_int(p.first);
        query.append_format(p.format.as_deref())?;
        query
            .append_int(p.min_mfn)
            .append_int(p.max_mfn)
            .append_narrow(p.sequential.as_deref())?;
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<SearchHits, ProtocolError> {
        check(&mut response)?;
        let total = response.read_int()?.max(0) as u32;
        let mut found = Vec::new();
        loop {
            let line = response.read_line();
            if line.is_empty() {
                break;
            }
            found.push(FoundLine::parse(&self.encoding.decode(&line)?)?);
        }
        Ok(SearchHits { total, found })
    }
}

/// Number of records matching an expression (`K` with an empty page).
#[derive(Debug, Clone)]
pub struct SearchCount {
    pub database: String,
    pub expression: String,
}

impl SearchCount {
    pub fn new(database: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            expression: expression.into(),
        }
    }
}

impl Operation for SearchCount {
    type Output = u32;

    fn command(&self) -> Command {
        Command::Search
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query
            .append_narrow(self.database.as_str())?
            .append_wide(self.expression.as_str())
            .append_int(0)
            .append_int(0);
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<u32, ProtocolError> {
        check(&mut response)?;
        Ok(response.read_int()?.max(0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::params;
    use crate::transport::scripted::reply;

    #[test]
    fn test_unencodable_request_keeps_query_id() {
        let mut session = crate::operations::testing::session();
        session.query_id = 7;
        let op = Search::new("\u{4e2d}", SearchParameters::new("K=ALG$"));
        assert!(op.build(&mut session).is_err());
        assert_eq!(session.query_id, 7);

        let op = Search::new("IBIS", SearchParameters::new("K=ALG$"));
        assert!(op.build(&mut session).is_ok());
        assert_eq!(session.query_id, 8);
    }

    #[test]
    fn test_search_request() {
        let op = Search::new(
            "IBIS",
            SearchParameters::new("K=ALG$").with_number(10).with_first(11),
        );
        assert_eq!(
            params(&op),
            vec!["IBIS", "K=ALG$", "10", "11", "", "0", "0", ""]
        );

        let op = Search::new(
            "IBIS",
            SearchParameters::new("A=Пушкин$")
                .with_format("@brief")
                .with_mfn_range(1, 100)
                .with_sequential("v200:'X'"),
        );
        assert_eq!(
            params(&op),
            vec!["IBIS", "A=Пушкин$", "0", "1", "@brief", "1", "100", "v200:'X'"]
        );
    }

    #[test]
    fn test_search_reply() {
        let data = reply("K", &["0", "5", "1", "2", "3", "4", "5"]);
        let hits = Search::new("IBIS", SearchParameters::new("T=A$"))
            .parse(data)
            .unwrap();
        assert_eq!(hits.total, 5);
        let mfns: Vec<u32> = hits.found.iter().map(|f| f.mfn).collect();
        assert_eq!(mfns, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_search_fewer_lines_than_total() {
        let data = reply("K", &["0", "5", "1", "2"]);
        let hits = Search::new("IBIS", SearchParameters::new("T=A$"))
            .parse(data)
            .unwrap();
        assert_eq!(hits.total, 5);
        assert_eq!(hits.found.len(), 2);
    }

    #[test]
    fn test_search_descriptions() {
        let data = reply("K", &["0", "2", "7#Пушкин А. С.", "9#Лермонтов М. Ю."]);
        let hits = Search::new("IBIS", SearchParameters::new("T=A$").with_format("@brief"))
            .with_descriptions()
            .parse(data)
            .unwrap();
        assert_eq!(hits.found[1].mfn, 9);
        assert_eq!(hits.found[1].description.as_deref(), Some("Лермонтов М. Ю."));
    }

    #[test]
    fn test_search_error() {
        let err = Search::new("IBIS", SearchParameters::new("("))
            .parse(reply("K", &["-1"]))
            .unwrap_err();
        assert_eq!(err.server_code(), Some(-1));
    }

    #[test]
    fn test_search_count() {
        let op = SearchCount::new("IBIS", "K=ALG$");
        assert_eq!(params(&op), vec!["IBIS", "K=ALG$", "0", "0"]);
        assert_eq!(op.parse(reply("K", &["0", "42"])).unwrap(), 42);
    }
}
