use super::{check, Operation};
use crate::outcome::Outcome;
use irbis_protocol::{
    ClientQuery, Command, Mfn, PostingParameters, ProtocolError, ServerResponse, TermInfo,
    TermParameters, TermPosting, READ_TERMS_CODES,
};

/// Reads dictionary terms forward (`H`) or backward (`P`).
#[derive(Debug, Clone)]
pub struct ReadTerms {
    pub database: String,
    pub parameters: TermParameters,
    pub accepted: Vec<i32>,
}

impl ReadTerms {
    pub fn new(database: impl Into<String>, parameters: TermParameters) -> Self {
        Self {
            database: database.into(),
            parameters,
            accepted: READ_TERMS_CODES.to_vec(),
        }
    }

    pub fn with_accepted_codes(mut self, codes: &[i32]) -> Self {
        self.accepted = codes.to_vec();
        self
    }
}

impl Operation for ReadTerms {
    type Output = Outcome<Vec<TermInfo>>;

    fn command(&self) -> Command {
        if self.parameters.reverse {
            Command::ReadTermsReverse
        } else {
            Command::ReadTerms
        }
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        let p = &self.parameters;
        query
            .append_narrow(self.database.as_str())?
            .append_wide(p.start.as_str())
            .append_int(p.number)
            .append_narrow(p.format.as_deref())?;
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<Self::Output, ProtocolError> {
        let code = response.read_return_code(&self.accepted)?;
        let terms = response
            .remaining_wide_lines()?
            .iter()
            .map(|line| TermInfo::parse(line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Outcome::from_code(code, terms))
    }
}

/// Reads the postings of one or more terms (`I`).
#[derive(Debug, Clone)]
pub struct ReadPostings {
    pub database: String,
    pub parameters: PostingParameters,
    pub accepted: Vec<i32>,
}

impl ReadPostings {
    pub fn new(database: impl Into<String>, parameters: PostingParameters) -> Self {
        Self {
            database: database.into(),
            parameters,
            accepted: READ_TERMS_CODES.to_vec(),
        }
    }

    pub fn with_accepted_codes(mut self, codes: &[i32]) -> Self {
        self.accepted = codes.to_vec();
        self
    }
}

impl Operation for ReadPostings {
    type Output = Outcome<Vec<TermPosting>>;

    fn command(&self) -> Command {
        Command::ReadPostings
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        let p = &self.parameters;
        query
            .append_narrow(self.database.as_str())?
            .append_int(p.number)
            .append_int(p.first)
            .append_narrow(p.format.as_deref())?;
        for term in &p.terms {
            query.append_wide(term.as_str());
        }
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<Self::Output, ProtocolError> {
        let code = response.read_return_code(&self.accepted)?;
        let postings = parse_postings(&mut response)?;
        Ok(Outcome::from_code(code, postings))
    }
}

/// Postings of one record for terms starting with a prefix (`V`).
#[derive(Debug, Clone)]
pub struct GetRecordPostings {
    pub database: String,
    pub mfn: Mfn,
    pub prefix: String,
}

impl GetRecordPostings {
    pub fn new(database: impl Into<String>, mfn: Mfn, prefix: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            mfn,
            prefix: prefix.into(),
        }
    }
}

impl Operation for GetRecordPostings {
    type Output = Vec<TermPosting>;

    fn command(&self) -> Command {
        Command::GetRecordPostings
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query
            .append_narrow(self.database.as_str())?
            .append_int(self.mfn)
            .append_wide(self.prefix.as_str());
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<Vec<TermPosting>, ProtocolError> {
        check(&mut response)?;
        parse_postings(&mut response)
    }
}

fn parse_postings(response: &mut ServerResponse) -> Result<Vec<TermPosting>, ProtocolError> {
    response
        .remaining_wide_lines()?
        .iter()
        .map(|line| TermPosting::parse(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::params;
    use crate::transport::scripted::reply;
    use irbis_protocol::TermQuery;

    #[test]
    fn test_read_terms_request() {
        let op = ReadTerms::new("IBIS", TermQuery::from(("K=", 5)).into_parameters());
        assert_eq!(op.command(), Command::ReadTerms);
        assert_eq!(params(&op), vec!["IBIS", "K=", "5", ""]);

        let reverse = TermParameters::new("K=Я").with_reverse().with_format("@brief");
        let op = ReadTerms::new("IBIS", reverse);
        assert_eq!(op.command(), Command::ReadTermsReverse);
        assert_eq!(params(&op)[3], "@brief");
    }

    #[test]
    fn test_read_terms_reply() {
        let data = reply("H", &["0", "3#K=АЛГЕБРА", "1#K=АЛГОРИТМ"]);
        let op = ReadTerms::new("IBIS", TermParameters::new("K=АЛГ"));
        let terms = op.parse(data).unwrap().ok().unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].count, 3);
        assert_eq!(terms[1].text, "K=АЛГОРИТМ");
    }

    #[test]
    fn test_read_terms_last_term() {
        let data = reply("H", &["-202", "1#K=ЯЗЫК"]);
        let op = ReadTerms::new("IBIS", TermParameters::new("K=Я"));
        let outcome = op.parse(data).unwrap();
        assert_eq!(outcome.code(), Some(-202));
        assert_eq!(outcome.value().len(), 1);
    }

    #[test]
    fn test_read_postings() {
        let parameters = PostingParameters::new("K=ALG").with_term("K=GEOM").with_number(2);
        let op = ReadPostings::new("IBIS", parameters);
        assert_eq!(params(&op), vec!["IBIS", "2", "1", "", "K=ALG", "K=GEOM"]);

        let data = reply("I", &["0", "1#200#1#1", "7#610#2#1"]);
        let postings = op.parse(data).unwrap().into_value();
        assert_eq!(postings[1].mfn, 7);
        assert_eq!(postings[1].tag, 610);
    }

    #[test]
    fn test_record_postings() {
        let op = GetRecordPostings::new("IBIS", 12, "A=");
        assert_eq!(params(&op), vec!["IBIS", "12", "A="]);
        let data = reply("V", &["0", "12#700#1#1#A=ИВАНОВ"]);
        let postings = op.parse(data).unwrap();
        assert_eq!(postings[0].text.as_deref(), Some("A=ИВАНОВ"));
        assert!(op.parse(reply("V", &["-202"])).is_err());
    }
}
