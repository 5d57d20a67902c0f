//! Embedding of related records requested with `include`.

use crate::domain::Entity;
use crate::domain::comment::{Comment, CommentField, CommentRelation};
use crate::domain::filter::{Filter, Relation, Where};
use crate::domain::post::{Post, PostRelation};
use crate::domain::tag::{Tag, TagRelation};
use crate::dto::{CommentDto, PostDto, TagDto};
use crate::repository::{EntityReader, RepositoryError, ThroughReader};
use crate::services::{ServiceError, ServiceResult};

/// An entity whose relations can be resolved through the repository `Repo`.
pub trait Expand<Repo>: Entity {
    type Relation: Relation;
    /// The record together with its embedded relations.
    type Expanded;

    fn expand(self, include: &[Self::Relation], repo: &Repo) -> ServiceResult<Self::Expanded>;
}

pub fn expand_all<E, R>(
    items: Vec<E>,
    include: &[E::Relation],
    repo: &R,
) -> ServiceResult<Vec<E::Expanded>>
where
    E: Expand<R>,
{
    items
        .into_iter()
        .map(|item| item.expand(include, repo))
        .collect()
}

fn failed<E: Entity>(
    relation: impl Relation,
    id: E::Id,
) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |e| {
        log::error!("Failed to include {} of {} {id}: {e}", relation.name(), E::NAME);
        e.into()
    }
}

impl<Repo> Expand<Repo> for Post
where
    Repo: ThroughReader<Post, Tag> + EntityReader<Comment>,
{
    type Relation = PostRelation;
    type Expanded = PostDto;

    fn expand(self, include: &[PostRelation], repo: &Repo) -> ServiceResult<PostDto> {
        let id = self.id;
        let mut dto = PostDto::from(self);
        for &relation in include {
            match relation {
                PostRelation::Tags => {
                    let tags = ThroughReader::<Post, Tag>::list_related(
                        repo,
                        id,
                        &Filter::default(),
                    )
                    .map_err(failed::<Post>(relation, id))?;
                    dto.tags = Some(tags);
                }
                PostRelation::Comments => {
                    let of_post = Filter::new(Where::eq(CommentField::PostId, id.get()));
                    let comments = EntityReader::<Comment>::find(repo, &of_post)
                        .map_err(failed::<Post>(relation, id))?;
                    dto.comments = Some(comments);
                }
            }
        }
        Ok(dto)
    }
}

impl<Repo> Expand<Repo> for Tag
where
    Repo: ThroughReader<Tag, Post>,
{
    type Relation = TagRelation;
    type Expanded = TagDto;

    fn expand(self, include: &[TagRelation], repo: &Repo) -> ServiceResult<TagDto> {
        let id = self.id;
        let mut dto = TagDto::from(self);
        for &relation in include {
            match relation {
                TagRelation::Posts => {
                    let posts = repo
                        .list_related(id, &Filter::default())
                        .map_err(failed::<Tag>(relation, id))?;
                    dto.posts = Some(posts);
                }
            }
        }
        Ok(dto)
    }
}

impl<Repo> Expand<Repo> for Comment
where
    Repo: EntityReader<Post>,
{
    type Relation = CommentRelation;
    type Expanded = CommentDto;

    fn expand(self, include: &[CommentRelation], repo: &Repo) -> ServiceResult<CommentDto> {
        let (id, post_id) = (self.id, self.post_id);
        let mut dto = CommentDto::from(self);
        for &relation in include {
            match relation {
                CommentRelation::Post => {
                    dto.post = repo
                        .find_by_id(post_id)
                        .map_err(failed::<Comment>(relation, id))?;
                }
            }
        }
        Ok(dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{PostId, TagId};
    use crate::repository::test::TestRepository;

    fn sample_repo() -> TestRepository {
        TestRepository::new()
            .with_post("First", "a")
            .with_post("Second", "b")
            .with_tag("rust")
            .with_link(1, 3)
            .with_comment(1, "nice")
    }

    fn post(repo: &TestRepository, id: i32) -> Post {
        EntityReader::<Post>::find_by_id(repo, PostId::new(id).unwrap())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn post_embeds_only_requested_relations() {
        let repo = sample_repo();

        let plain = post(&repo, 1).expand(&[], &repo).unwrap();
        assert_eq!(plain.tags, None);
        assert_eq!(plain.comments, None);

        let full = post(&repo, 1)
            .expand(&[PostRelation::Tags, PostRelation::Comments], &repo)
            .unwrap();
        let tags = full.tags.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name.as_str(), "rust");
        assert_eq!(full.comments.unwrap()[0].text.as_str(), "nice");

        let unlinked = post(&repo, 2)
            .expand(&[PostRelation::Tags, PostRelation::Comments], &repo)
            .unwrap();
        assert_eq!(unlinked.tags, Some(Vec::new()));
        assert_eq!(unlinked.comments, Some(Vec::new()));
    }

    #[test]
    fn tag_embeds_linked_posts() {
        let repo = sample_repo();
        let tag = EntityReader::<Tag>::find_by_id(&repo, TagId::new(3).unwrap())
            .unwrap()
            .unwrap();

        let dto = tag.expand(&[TagRelation::Posts], &repo).unwrap();
        let titles: Vec<&str> = dto
            .posts
            .as_deref()
            .unwrap()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["First"]);
    }

    #[test]
    fn comments_embed_their_post() {
        let repo = sample_repo();
        let comments = EntityReader::<Comment>::find(&repo, &Filter::default()).unwrap();

        let dtos = expand_all(comments, &[CommentRelation::Post], &repo).unwrap();
        assert_eq!(dtos.len(), 1);
        assert_eq!(dtos[0].comment.text.as_str(), "nice");
        assert_eq!(dtos[0].post.as_ref().unwrap().title.as_str(), "First");
    }
}
