use crate::domain::work_item::{BUG, TASK, USER_STORY, WorkItem};
use crate::error::AppResult;
use crate::services::WorkItemService;

/// Title markers of catch-all stories ("general"), upper case. Both spellings
/// occur in practice.
const GENERAL_STORY_MARKERS: [&str; 2] = ["ОБЩАЯ", "ОБЩЯЯ"];

/// Picks the work item a changeset is reported against.
///
/// Bugs win over user stories, user stories over tasks. A task is traced to
/// the first linked user story that is not a catch-all story, or reported
/// itself when there is none. `None` when nothing qualifies.
pub async fn resolve_work_item(
    tracker: &dyn WorkItemService,
    linked: Vec<WorkItem>,
) -> AppResult<Option<WorkItem>> {
    if let Some(bug) = first_of_type(&linked, BUG) {
        return Ok(Some(bug.clone()));
    }
    if let Some(story) = first_of_type(&linked, USER_STORY) {
        return Ok(Some(story.clone()));
    }
    let Some(task) = first_of_type(&linked, TASK) else {
        return Ok(None);
    };

    for id in &task.links {
        let candidate = tracker.work_item(*id).await?;
        if candidate.is_type(USER_STORY) && !is_general_story(&candidate.title) {
            return Ok(Some(candidate));
        }
    }

    Ok(Some(task.clone()))
}

fn first_of_type<'a>(items: &'a [WorkItem], type_name: &str) -> Option<&'a WorkItem> {
    items.iter().find(|item| item.is_type(type_name))
}

fn is_general_story(title: &str) -> bool {
    let title = title.to_uppercase();
    GENERAL_STORY_MARKERS
        .iter()
        .any(|marker| title.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeServer;

    fn tracker(items: Vec<WorkItem>) -> FakeServer {
        items
            .into_iter()
            .fold(FakeServer::default(), FakeServer::with_work_item)
    }

    #[tokio::test]
    async fn no_links_resolves_to_none() {
        let server = FakeServer::default();
        let resolved = resolve_work_item(&server, Vec::new()).await.unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn bug_wins_regardless_of_order() {
        let server = FakeServer::default();
        let linked = vec![
            WorkItem::new(1, TASK, "Task"),
            WorkItem::new(2, USER_STORY, "Story"),
            WorkItem::new(3, BUG, "First bug"),
            WorkItem::new(4, BUG, "Second bug"),
        ];
        let resolved = resolve_work_item(&server, linked).await.unwrap().unwrap();
        assert_eq!(resolved.id, 3);
    }

    #[tokio::test]
    async fn story_wins_over_task() {
        let server = FakeServer::default();
        let linked = vec![
            WorkItem::new(1, TASK, "Task"),
            WorkItem::new(2, USER_STORY, "Story"),
        ];
        let resolved = resolve_work_item(&server, linked).await.unwrap().unwrap();
        assert_eq!(resolved.id, 2);
    }

    #[tokio::test]
    async fn task_is_traced_to_specific_story() {
        let server = tracker(vec![
            WorkItem::new(10, USER_STORY, "Общая история спринта"),
            WorkItem::new(11, USER_STORY, "Export invoices"),
        ]);
        let linked = vec![WorkItem::new(1, TASK, "Implement export").with_links([10, 11])];
        let resolved = resolve_work_item(&server, linked).await.unwrap().unwrap();
        assert_eq!(resolved.id, 11);
    }

    #[tokio::test]
    async fn task_falls_back_to_itself_for_general_stories() {
        for title in ["Общая задача", "ОБЩЯЯ задача"] {
            let server = tracker(vec![WorkItem::new(10, USER_STORY, title)]);
            let linked = vec![WorkItem::new(1, TASK, "Implement export").with_links([10])];
            let resolved = resolve_work_item(&server, linked).await.unwrap().unwrap();
            assert_eq!(resolved.id, 1, "title {title}");
        }
    }

    #[tokio::test]
    async fn task_ignores_linked_non_stories() {
        let server = tracker(vec![
            WorkItem::new(10, BUG, "Linked bug"),
            WorkItem::new(11, TASK, "Sibling task"),
        ]);
        let linked = vec![WorkItem::new(1, TASK, "Implement").with_links([10, 11])];
        let resolved = resolve_work_item(&server, linked).await.unwrap().unwrap();
        assert_eq!(resolved.id, 1);
    }

    #[tokio::test]
    async fn stops_fetching_after_first_match() {
        let server = tracker(vec![
            WorkItem::new(10, USER_STORY, "Checkout"),
            WorkItem::new(11, USER_STORY, "Payments"),
        ]);
        let linked = vec![WorkItem::new(1, TASK, "Implement").with_links([10, 11])];
        let resolved = resolve_work_item(&server, linked).await.unwrap().unwrap();
        assert_eq!(resolved.id, 10);
        assert_eq!(server.work_item_fetches(), 1);
    }

    #[tokio::test]
    async fn unknown_types_resolve_to_none() {
        let server = FakeServer::default();
        let linked = vec![WorkItem::new(5, "Epic", "Big thing")];
        assert_eq!(resolve_work_item(&server, linked).await.unwrap(), None);
    }

    #[tokio::test]
    async fn lookup_failure_propagates() {
        let server = FakeServer::default();
        let linked = vec![WorkItem::new(1, TASK, "Implement").with_links([99])];
        assert!(resolve_work_item(&server, linked).await.is_err());
    }
}
