use std::fmt;

use mongodb::Client;
use mongodb::bson::{DateTime, Document, doc, from_document};
use serde::Deserialize;

use crate::common::{DatabaseError, DatabaseResult};

/// Replication state of a member, as reported in `stateStr`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum MemberState {
    Primary,
    Secondary,
    /// Any other server-defined state (ARBITER, RECOVERING, STARTUP2, ...)
    Other(String),
}

impl MemberState {
    pub fn label(&self) -> &str {
        match self {
            MemberState::Primary => "PRIMARY",
            MemberState::Secondary => "SECONDARY",
            MemberState::Other(label) => label,
        }
    }
}

impl From<String> for MemberState {
    fn from(label: String) -> Self {
        match label.as_str() {
            "PRIMARY" => MemberState::Primary,
            "SECONDARY" => MemberState::Secondary,
            _ => MemberState::Other(label),
        }
    }
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of `replSetGetStatus.members`
#[derive(Debug, Clone, Deserialize)]
pub struct MemberStatus {
    /// `host:port` as configured in the replica set
    pub name: String,

    #[serde(rename = "stateStr")]
    pub state: MemberState,

    /// Wall time of the last applied operation (absent on arbiters)
    #[serde(rename = "optimeDate", default)]
    pub optime_date: Option<DateTime>,
}

/// Snapshot of `replSetGetStatus`
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicaStatus {
    /// Replica set name
    pub set: String,

    /// Members in the order the server reports them
    pub members: Vec<MemberStatus>,
}

impl ReplicaStatus {
    /// Parse the raw command reply
    pub fn from_document(reply: Document) -> DatabaseResult<Self> {
        from_document(reply).map_err(|e| {
            DatabaseError::HealthCheckFailed(format!("unexpected replSetGetStatus reply: {}", e))
        })
    }

    /// The current primary, if the set has one
    pub fn primary(&self) -> Option<&MemberStatus> {
        self.members
            .iter()
            .find(|member| member.state == MemberState::Primary)
    }

    /// Whole seconds `member` is behind the primary.
    ///
    /// Only computed for secondaries with a known optime that is not ahead
    /// of the primary's. Everything else (no primary, arbiters, members
    /// ahead of a stale primary) yields `None`.
    pub fn lag_behind_primary(&self, member: &MemberStatus) -> Option<i64> {
        if member.state != MemberState::Secondary {
            return None;
        }

        let primary_optime = self.primary()?.optime_date?;
        let member_optime = member.optime_date?;
        let lag_ms = primary_optime.timestamp_millis() - member_optime.timestamp_millis();

        (lag_ms >= 0).then_some(lag_ms / 1000)
    }
}

/// Run `replSetGetStatus` against `admin`
///
/// # Example
/// ```ignore
/// use database::mongodb::{connect_from_config, fetch_replica_status};
///
/// let client = connect_from_config(&config).await?;
/// let status = fetch_replica_status(&client).await?;
/// println!("{} has {} members", status.set, status.members.len());
/// ```
pub async fn fetch_replica_status(client: &Client) -> DatabaseResult<ReplicaStatus> {
    let reply = client
        .database("admin")
        .run_command(doc! { "replSetGetStatus": 1 })
        .await?;

    ReplicaStatus::from_document(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64) -> DateTime {
        DateTime::from_millis(seconds * 1000)
    }

    fn member(name: &str, state: &str, optime: Option<DateTime>) -> MemberStatus {
        MemberStatus {
            name: name.to_string(),
            state: MemberState::from(state.to_string()),
            optime_date: optime,
        }
    }

    fn status(members: Vec<MemberStatus>) -> ReplicaStatus {
        ReplicaStatus {
            set: "rs0".to_string(),
            members,
        }
    }

    #[test]
    fn test_member_state_from_label() {
        assert_eq!(MemberState::from("PRIMARY".to_string()), MemberState::Primary);
        assert_eq!(MemberState::from("SECONDARY".to_string()), MemberState::Secondary);
        assert_eq!(
            MemberState::from("ARBITER".to_string()),
            MemberState::Other("ARBITER".to_string())
        );
        assert_eq!(MemberState::Other("RECOVERING".to_string()).to_string(), "RECOVERING");
    }

    #[test]
    fn test_parse_repl_set_get_status_reply() {
        let reply = doc! {
            "set": "rs0",
            "date": at(1_700_000_100),
            "myState": 1,
            "members": [
                {
                    "_id": 0,
                    "name": "node-1.example.com:27017",
                    "health": 1.0,
                    "state": 1,
                    "stateStr": "PRIMARY",
                    "optimeDate": at(1_700_000_100),
                },
                {
                    "_id": 1,
                    "name": "node-2.example.com:27017",
                    "health": 1.0,
                    "state": 2,
                    "stateStr": "SECONDARY",
                    "optimeDate": at(1_700_000_097),
                },
                {
                    "_id": 2,
                    "name": "node-3.example.com:27017",
                    "health": 1.0,
                    "state": 7,
                    "stateStr": "ARBITER",
                },
            ],
            "ok": 1.0,
        };

        let status = ReplicaStatus::from_document(reply).unwrap();
        assert_eq!(status.set, "rs0");
        assert_eq!(status.members.len(), 3);
        assert_eq!(status.members[2].state, MemberState::Other("ARBITER".to_string()));
        assert_eq!(status.members[2].optime_date, None);
        assert_eq!(status.primary().unwrap().name, "node-1.example.com:27017");
        assert_eq!(status.lag_behind_primary(&status.members[1]), Some(3));
    }

    #[test]
    fn test_parse_rejects_reply_without_members() {
        let result = ReplicaStatus::from_document(doc! { "ok": 0.0, "errmsg": "not running with --replSet" });
        assert!(matches!(result, Err(DatabaseError::HealthCheckFailed(_))));
    }

    #[test]
    fn test_lag_is_primary_minus_member_in_seconds() {
        let status = status(vec![
            member("a:27017", "PRIMARY", Some(at(1_000))),
            member("b:27017", "SECONDARY", Some(at(1_000))),
            member("c:27017", "SECONDARY", Some(at(988))),
        ]);

        assert_eq!(status.lag_behind_primary(&status.members[1]), Some(0));
        assert_eq!(status.lag_behind_primary(&status.members[2]), Some(12));
    }

    #[test]
    fn test_lag_truncates_to_whole_seconds() {
        let status = status(vec![
            member("a:27017", "PRIMARY", Some(DateTime::from_millis(10_900))),
            member("b:27017", "SECONDARY", Some(DateTime::from_millis(9_000))),
        ]);

        assert_eq!(status.lag_behind_primary(&status.members[1]), Some(1));
    }

    #[test]
    fn test_lag_omitted_when_secondary_is_ahead() {
        let status = status(vec![
            member("a:27017", "PRIMARY", Some(at(1_000))),
            member("b:27017", "SECONDARY", Some(at(1_005))),
        ]);

        assert_eq!(status.lag_behind_primary(&status.members[1]), None);
    }

    #[test]
    fn test_lag_omitted_without_primary() {
        let status = status(vec![
            member("a:27017", "SECONDARY", Some(at(1_000))),
            member("b:27017", "SECONDARY", Some(at(990))),
        ]);

        assert!(status.primary().is_none());
        assert_eq!(status.lag_behind_primary(&status.members[1]), None);
    }

    #[test]
    fn test_lag_omitted_for_non_secondaries() {
        let status = status(vec![
            member("a:27017", "PRIMARY", Some(at(1_000))),
            member("b:27017", "RECOVERING", Some(at(900))),
            member("c:27017", "SECONDARY", None),
        ]);

        assert_eq!(status.lag_behind_primary(&status.members[0]), None);
        assert_eq!(status.lag_behind_primary(&status.members[1]), None);
        assert_eq!(status.lag_behind_primary(&status.members[2]), None);
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB replica set
    async fn test_fetch_replica_status() {
        let url = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/?replicaSet=rs0".to_string());
        let client = Client::with_uri_str(&url).await.unwrap();

        let status = fetch_replica_status(&client).await.unwrap();
        assert!(!status.members.is_empty());
        assert!(
            status
                .members
                .iter()
                .filter(|m| m.state == MemberState::Primary)
                .count()
                <= 1
        );
    }
}
