//! Membership configuration for direct and indirect containers.
//!
//! A membership container names a membership resource and a relation. Each
//! child then contributes member triples that live either on the membership
//! resource (`hasMemberRelation`) or on the child itself (`isMemberOfRelation`).

use crate::model::InteractionModel;
use crate::rdf::{Iri, Subject, Term, Triple};
use crate::resource::{base_of, Resource};
use crate::vocab::ldp;

/// Direction and predicate of member triples
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRelation {
    /// `(membershipResource, relation, member)`
    HasMember(Iri),
    /// `(child, relation, membershipResource)`
    IsMemberOf(Iri),
}

/// Membership settings read from a container's user-managed graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipConfig {
    pub membership_resource: Iri,
    pub relation: MemberRelation,
    /// `None` means `ldp:MemberSubject`: the member is the child itself.
    pub inserted_content: Option<Iri>,
}

/// A member triple and the resource whose server-managed graph stores it
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MemberTriple {
    pub holder: Iri,
    pub triple: Triple,
}

impl MembershipConfig {
    /// Configuration of `container`, or `None` if it does not maintain membership.
    ///
    /// Without an explicit relation the container uses `ldp:member`.
    pub fn from_container(container: &Resource) -> Option<Self> {
        if !container.interaction_model.is_membership_container() {
            return None;
        }

        let graph = container.user_graph();
        let subject = Subject::from(container.identifier.clone());
        let first_iri = |predicate: &str| {
            graph
                .objects(&subject, predicate)
                .find_map(Term::as_iri)
                .cloned()
        };

        let membership_resource = first_iri(ldp::MEMBERSHIP_RESOURCE)?;
        let relation = match (
            first_iri(ldp::HAS_MEMBER_RELATION),
            first_iri(ldp::IS_MEMBER_OF_RELATION),
        ) {
            (Some(relation), _) => MemberRelation::HasMember(relation),
            (None, Some(relation)) => MemberRelation::IsMemberOf(relation),
            (None, None) => MemberRelation::HasMember(Iri::new(ldp::MEMBER)),
        };
        let inserted_content = match container.interaction_model {
            InteractionModel::IndirectContainer => first_iri(ldp::INSERTED_CONTENT_RELATION)
                .filter(|relation| relation != ldp::MEMBER_SUBJECT),
            _ => None,
        };

        Some(Self {
            membership_resource,
            relation,
            inserted_content,
        })
    }

    /// Resource holding `hasMemberRelation` triples (fragment stripped).
    pub fn target(&self) -> Iri {
        base_of(&self.membership_resource)
    }

    /// Members contributed by `child`.
    pub fn members_of(&self, child: &Resource) -> Vec<Term> {
        match &self.inserted_content {
            None => vec![Term::from(child.identifier.clone())],
            Some(relation) => child
                .user_graph()
                .with_predicate(relation.as_str())
                .map(|t| t.object.clone())
                .collect(),
        }
    }

    /// Member triples `child` contributes under this configuration.
    pub fn member_triples(&self, child: &Resource) -> Vec<MemberTriple> {
        match &self.relation {
            MemberRelation::HasMember(relation) => {
                let holder = self.target();
                self.members_of(child)
                    .into_iter()
                    .map(|member| MemberTriple {
                        holder: holder.clone(),
                        triple: Triple::new(
                            self.membership_resource.clone(),
                            relation.clone(),
                            member,
                        ),
                    })
                    .collect()
            }
            MemberRelation::IsMemberOf(relation) => vec![MemberTriple {
                holder: child.identifier.clone(),
                triple: Triple::new(
                    child.identifier.clone(),
                    relation.clone(),
                    self.membership_resource.clone(),
                ),
            }],
        }
    }
}
