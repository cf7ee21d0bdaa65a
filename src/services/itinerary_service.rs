//! Mongo persistence for planning runs and feedback.

use bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::models::itinerary::{FeedbackRecord, PlanningRun};

fn runs_collection(client: &Client) -> Collection<PlanningRun> {
    client.database("Itineraries").collection("Runs")
}

fn feedback_collection(client: &Client) -> Collection<FeedbackRecord> {
    client.database("Itineraries").collection("Feedback")
}

/// Persist one run as a single document. The insert is the commit point for
/// the whole result; there is nothing partial to clean up on failure.
pub async fn save_planning_run(
    client: &Client,
    run: &PlanningRun,
) -> Result<(), mongodb::error::Error> {
    runs_collection(client).insert_one(run).await?;
    Ok(())
}

pub async fn get_planning_run(
    client: &Client,
    id: ObjectId,
) -> Result<Option<PlanningRun>, mongodb::error::Error> {
    runs_collection(client).find_one(doc! { "_id": id }).await
}

pub async fn save_feedback(
    client: &Client,
    feedback: &FeedbackRecord,
) -> Result<(), mongodb::error::Error> {
    feedback_collection(client).insert_one(feedback).await?;
    Ok(())
}
