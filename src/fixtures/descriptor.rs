use crate::descriptor::RepositoryDescriptor;

pub fn create_descriptor(name: &str) -> RepositoryDescriptor {
    RepositoryDescriptor::new(name, &format!("git@bitbucket.org:workspace/{}.git", name))
}

pub fn create_batch(names: &[&str]) -> Vec<RepositoryDescriptor> {
    names.iter().map(|name| create_descriptor(name)).collect()
}

pub fn names(repositories: &[RepositoryDescriptor]) -> Vec<String> {
    repositories
        .iter()
        .map(|repository| repository.name.clone())
        .collect()
}
